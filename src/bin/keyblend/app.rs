//! keyblend - application state and event loop

use std::io::stdout;
use std::time::Duration;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{error, info};

use keyblend::{
    assets::{AssetLoader, OggDirectory, ToneBank},
    io::ReceivedBatch,
    playback::CpalPlayback,
    session::{LocalSession, RemotePlayback},
    AgentId, Clock, Color, EngineConfig, KeyStateEngine, Participant,
};

use super::ui;

/// How often the local performance is bounced back through the echo agent
const ECHO_INTERVAL_MS: f64 = 2_000.0;
const VELOCITY: f32 = 0.8;
const ASSETS_ENV: &str = "KEYBLEND_ASSETS";
const MAX_OCTAVE: u8 = 8;

/// Computer keys laid out like one and a half octaves of piano, with their
/// semitone offset from the current octave's C.
const KEY_MAP: [(char, u8); 18] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
    ('o', 13),
    ('l', 14),
    ('p', 15),
    (';', 16),
    ('\'', 17),
];

/// Where assets are coming from
pub enum AssetStatus {
    Loading,
    Ready,
    Failed(String),
}

pub struct App {
    pub engine: KeyStateEngine<CpalPlayback>,
    loader: AssetLoader,
    pub local: LocalSession,
    echo: RemotePlayback,
    echo_id: AgentId,
    pub octave: u8,
    pub enhanced_keys: bool,
    pub assets: AssetStatus,
    last_flush_ms: f64,
    should_quit: bool,
}

impl App {
    pub fn new() -> EyreResult<Self> {
        let device = CpalPlayback::open_default().wrap_err("failed to open audio output")?;

        let loader = match std::env::var_os(ASSETS_ENV) {
            Some(dir) => {
                info!(dir = ?dir, "loading ogg samples");
                AssetLoader::spawn(OggDirectory::new(dir))
            }
            None => AssetLoader::spawn(ToneBank::new().with_sample_rate(device.sample_rate())),
        };

        let engine = KeyStateEngine::new(device, EngineConfig::default());
        let now = engine.clock().now_ms();

        let local = LocalSession::new(
            Participant::new("local", "You", Color::new(255, 140, 40)),
            now,
        );
        let echo_participant = Participant::new("echo", "Echo", Color::new(70, 150, 255));
        let echo_id = echo_participant.id.clone();
        let mut echo = RemotePlayback::new();
        echo.join(echo_participant);

        Ok(Self {
            engine,
            loader,
            local,
            echo,
            echo_id,
            octave: 5,
            enhanced_keys: false,
            assets: AssetStatus::Loading,
            last_flush_ms: now,
            should_quit: false,
        })
    }

    /// Run the event loop until the user quits
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.enhanced_keys = matches!(crossterm::terminal::supports_keyboard_enhancement(), Ok(true));
        if self.enhanced_keys {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        execute!(stdout(), EnableFocusChange)?;

        let result = self.event_loop(terminal);

        if self.enhanced_keys {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        execute!(stdout(), DisableFocusChange)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_assets();

            let now = self.engine.clock().now_ms();
            self.echo_local_performance(now);
            self.echo.drain_due(now, &mut self.engine);
            self.engine.tick(now);

            terminal.draw(|frame| ui::render(frame, self))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                self.handle_event(event::read()?);
            }
        }
        Ok(())
    }

    fn poll_assets(&mut self) {
        match self.loader.poll() {
            Some(Ok(bank)) => {
                self.engine.install_assets(bank);
                self.assets = AssetStatus::Ready;
            }
            Some(Err(err)) => {
                error!("asset loading failed: {}", err);
                self.assets = AssetStatus::Failed(err.to_string());
            }
            None => {}
        }
    }

    /// Send what the local player did since the last flush back through the
    /// batch path, as if another participant had played it.
    fn echo_local_performance(&mut self, now: f64) {
        if now - self.last_flush_ms < ECHO_INTERVAL_MS {
            return;
        }
        let start = self.last_flush_ms;
        self.last_flush_ms = now;

        if let Some(batch) = self.local.flush(now) {
            self.echo.enqueue(
                ReceivedBatch {
                    batch,
                    start_time: start,
                    end_time: now,
                    user: self.echo_id.clone(),
                },
                now,
            );
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => match key.kind {
                KeyEventKind::Press => self.key_down(key.code),
                KeyEventKind::Release => self.key_up(key.code),
                KeyEventKind::Repeat => {}
            },
            Event::FocusLost => self.local.release_all(&mut self.engine),
            _ => {}
        }
    }

    fn key_down(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('z') => self.octave = self.octave.saturating_sub(1),
            KeyCode::Char('x') => self.octave = (self.octave + 1).min(MAX_OCTAVE),
            KeyCode::Char(c) => {
                if let Some(key) = self.key_for(c) {
                    // Without release events every press would stack; let go
                    // of the previous one first.
                    if !self.enhanced_keys {
                        self.local.release(&mut self.engine, key);
                    }
                    self.local.press(&mut self.engine, key, VELOCITY);
                }
            }
            _ => {}
        }
    }

    fn key_up(&mut self, code: KeyCode) {
        if let KeyCode::Char(c) = code {
            if let Some(key) = self.key_for(c) {
                self.local.release(&mut self.engine, key);
            }
        }
    }

    fn key_for(&self, c: char) -> Option<u8> {
        let (_, offset) = KEY_MAP.iter().find(|(k, _)| *k == c.to_ascii_lowercase())?;
        let key = self.octave as usize * 12 + *offset as usize;
        u8::try_from(key).ok().filter(|&k| (k as usize) < keyblend::KEY_COUNT)
    }

    /// First key shown on screen; always a C, one octave below the playing one
    pub fn view_start(&self) -> u8 {
        (self.octave.saturating_sub(1) * 12).min(84)
    }
}
