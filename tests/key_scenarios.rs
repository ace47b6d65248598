use std::rc::Rc;

use keyblend::{
    assets::{SampleBank, SampleBuffer},
    playback::{DeviceCommand, RecordingDevice},
    synth::{VoiceId, VoiceStatus},
    AgentId, Clock, Color, EngineConfig, KeyStateEngine, ManualClock,
};

type Engine = KeyStateEngine<RecordingDevice, Rc<ManualClock>>;

const RED: Color = Color::new(255, 0, 0);
const GREEN: Color = Color::new(0, 255, 0);
const BLUE: Color = Color::new(0, 0, 255);

/// Engine with a long silent sample on every key, so voices only end when
/// released.
fn ready_engine() -> (Engine, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::starting_at(10_000.0));
    let mut engine =
        KeyStateEngine::with_clock(RecordingDevice::new(), EngineConfig::default(), clock.clone());
    engine.install_assets(SampleBank::uniform(SampleBuffer::new(
        vec![0.0; 20_000],
        1,
        1_000,
    )));
    (engine, clock)
}

fn started_voices(engine: &Engine) -> Vec<VoiceId> {
    engine
        .voices()
        .device()
        .commands()
        .iter()
        .filter_map(|c| match c {
            DeviceCommand::Start { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

fn assert_in_range(engine: &Engine) {
    for key in 0..keyblend::KEY_COUNT as u8 {
        let strength = engine.press_strength(key);
        assert!((0.0..=1.0).contains(&strength), "key {} strength {}", key, strength);
        for p in engine.pressers(key) {
            assert!(p.fade > 0.0 && p.fade <= 1.0, "key {} fade {}", key, p.fade);
        }
    }
}

#[test]
fn press_release_settles_to_rest() {
    let (mut engine, clock) = ready_engine();
    let a = AgentId::from("A");
    let start = clock.now_ms();

    engine.press(60, 0.8, &a, RED);
    clock.set(start + 100.0);
    engine.update();
    assert_eq!(engine.mixed_color(60), RED);
    assert!((engine.press_strength(60) - 1.0).abs() < 1e-6);

    assert!(engine.release(60, &a));
    let released = clock.now_ms();

    // 350 ms after release the presser has fully faded
    clock.set(released + 350.0);
    engine.update();
    assert!(engine.pressers(60).is_empty());

    clock.set(released + 900.0);
    engine.update();
    assert!(engine.pressers(60).is_empty());
    assert_eq!(engine.mixed_color(60), Color::WHITE);
    assert_eq!(engine.press_strength(60), 0.0);

    let voice = started_voices(&engine)[0];
    assert_eq!(engine.voices().status(voice), VoiceStatus::Removed);
    assert!(!engine.voices().device().is_playing(voice));
}

#[test]
fn release_mid_fade_is_between() {
    let (mut engine, clock) = ready_engine();
    let a = AgentId::from("A");
    engine.press(60, 0.8, &a, RED);
    engine.release(60, &a);

    clock.advance(150.0);
    engine.update();
    let presser = &engine.pressers(60)[0];
    assert!((presser.fade - 0.5).abs() < 1e-6);
    assert_eq!(engine.mixed_color(60), Color::new(255, 128, 128));
}

#[test]
fn voice_removed_after_falloff_plus_padding() {
    let (mut engine, clock) = ready_engine();
    let a = AgentId::from("A");

    for key in [21u8, 60, 108] {
        engine.press(key, 1.0, &a, BLUE);
    }
    clock.advance(40.0);
    for key in [21u8, 60, 108] {
        assert!(engine.release(key, &a));
    }

    clock.advance(799.0);
    engine.update();
    for voice in started_voices(&engine) {
        assert_eq!(engine.voices().status(voice), VoiceStatus::Releasing);
    }

    clock.advance(1.0);
    engine.update();
    for voice in started_voices(&engine) {
        assert_eq!(engine.voices().status(voice), VoiceStatus::Removed);
        assert_eq!(engine.voices().device().stop_count(voice), 1);
    }
    for key in [21u8, 60, 108] {
        assert!(engine.pressers(key).is_empty());
    }
}

#[test]
fn two_agents_one_releases() {
    let (mut engine, clock) = ready_engine();
    let a = AgentId::from("A");
    let b = AgentId::from("B");

    engine.press(64, 1.0, &a, RED);
    clock.advance(10.0);
    engine.press(64, 1.0, &b, GREEN);
    clock.advance(10.0);
    assert!(engine.release(64, &a));

    let active: Vec<_> = engine.pressers(64).iter().filter(|p| p.pressed).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].agent, b);

    // B is the oldest full layer; A is still fading and painted over it
    clock.advance(100.0);
    engine.update();
    let mixed = engine.mixed_color(64);
    assert!(mixed.r > mixed.g && mixed.g > 0, "{:?}", mixed);
    assert_eq!(mixed.b, 0);
    assert_eq!(engine.press_strength(64), 1.0);

    // Once A is gone B alone paints the key
    clock.advance(400.0);
    engine.update();
    assert_eq!(engine.pressers(64).len(), 1);
    assert_eq!(engine.mixed_color(64), GREEN);
    assert_eq!(engine.press_strength(64), 1.0);
}

#[test]
fn older_full_presser_wins_over_newer_fading_one() {
    let (mut engine, clock) = ready_engine();
    let a = AgentId::from("A");
    let b = AgentId::from("B");

    engine.press(64, 1.0, &a, RED);
    engine.press(64, 1.0, &b, GREEN);
    engine.release(64, &b);

    clock.advance(150.0);
    engine.update();
    assert_eq!(engine.mixed_color(64), RED);
}

#[test]
fn fading_layers_blend_under_the_base() {
    let (mut engine, clock) = ready_engine();
    let a = AgentId::from("A");
    let b = AgentId::from("B");

    engine.press(64, 1.0, &a, RED);
    engine.release(64, &a);
    clock.advance(150.0);
    engine.press(64, 1.0, &b, GREEN);
    engine.update();

    // Base is B (green); A at fade 0.5 is painted over it
    assert_eq!(engine.mixed_color(64), Color::new(128, 128, 0));
    assert_eq!(engine.press_strength(64), 1.0);
}

#[test]
fn stuck_key_auto_releases_at_5300ms() {
    let (mut engine, clock) = ready_engine();
    let a = AgentId::from("A");
    let pressed = clock.now_ms();
    engine.press(70, 1.0, &a, RED);

    clock.set(pressed + 5_000.0);
    engine.update();
    assert_eq!(engine.pressers(70)[0].fade, 1.0);

    clock.set(pressed + 5_150.0);
    engine.update();
    assert!((engine.pressers(70)[0].fade - 0.5).abs() < 1e-6);
    assert_eq!(engine.voices().device().release_count(), 0);

    clock.set(pressed + 5_300.0);
    engine.update();
    assert!(engine.pressers(70).is_empty());
    assert_eq!(engine.voices().device().release_count(), 1);
    assert_eq!(engine.mixed_color(70), Color::BLACK);

    // No second release later, and the voice is torn down once
    clock.set(pressed + 7_000.0);
    engine.update();
    assert_eq!(engine.voices().device().release_count(), 1);
    let voice = started_voices(&engine)[0];
    assert_eq!(engine.voices().device().stop_count(voice), 1);
    assert_eq!(engine.voices().status(voice), VoiceStatus::Removed);

    // The agent's late release finds nothing
    assert!(!engine.release(70, &a));
}

#[test]
fn unknown_agent_release_mutates_nothing() {
    let (mut engine, clock) = ready_engine();
    engine.press(60, 1.0, &AgentId::from("A"), RED);
    clock.advance(10.0);
    engine.update();

    let before = engine.pressers(60).to_vec();
    let commands = engine.voices().device().commands().len();

    assert!(!engine.release(60, &AgentId::from("stranger")));
    assert!(!engine.release(61, &AgentId::from("A")));
    assert_eq!(engine.pressers(60), &before[..]);
    assert_eq!(engine.voices().device().commands().len(), commands);
}

#[test]
fn unloaded_assets_ignore_everything() {
    let clock = Rc::new(ManualClock::new());
    let mut engine =
        KeyStateEngine::with_clock(RecordingDevice::new(), EngineConfig::default(), clock.clone());

    engine.press(61, 1.0, &AgentId::from("B"), GREEN);
    clock.advance(100.0);
    engine.update();

    assert!(engine.pressers(61).is_empty());
    assert!(engine.voices().device().commands().is_empty());
    assert_eq!(engine.mixed_color(61), Color::BLACK);
    assert_eq!(engine.press_strength(61), 0.0);
}

#[test]
fn natural_end_and_release_race_is_harmless() {
    let clock = Rc::new(ManualClock::new());
    let mut engine =
        KeyStateEngine::with_clock(RecordingDevice::new(), EngineConfig::default(), clock.clone());
    // 200 ms samples: the natural end beats the 800 ms release teardown
    engine.install_assets(SampleBank::uniform(SampleBuffer::new(vec![0.0; 200], 1, 1_000)));
    let a = AgentId::from("A");

    engine.press(60, 1.0, &a, RED);
    clock.advance(100.0);
    engine.release(60, &a);

    clock.advance(2_000.0);
    engine.update();

    let voice = started_voices(&engine)[0];
    assert_eq!(engine.voices().device().stop_count(voice), 1);
    assert_eq!(engine.voices().pending_tasks(), 0);
    assert_eq!(engine.voices().live_count(), 0);
}

#[test]
fn chaotic_session_stays_in_range() {
    let (mut engine, clock) = ready_engine();
    let agents: Vec<AgentId> = (0..5).map(|i| AgentId::new(format!("agent-{}", i))).collect();

    // Deterministic pseudo-random walk
    let mut state = 0x2545_f491_u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };

    for _ in 0..2_000 {
        let r = next();
        let key = (r % 128) as u8;
        let agent = &agents[(r as usize >> 8) % agents.len()];
        match (r >> 16) % 4 {
            0 | 1 => engine.press(key, (r % 100) as f32 / 100.0, agent, Color::new(key, 255 - key, 90)),
            2 => {
                engine.release(key, agent);
            }
            _ => engine.release_all(agent),
        }
        clock.advance(((r >> 20) % 40) as f64);
        engine.update();
        assert_in_range(&engine);
    }

    // Everything eventually settles
    clock.advance(10_000.0);
    engine.update();
    clock.advance(1_000.0);
    engine.update();
    for key in 0..keyblend::KEY_COUNT as u8 {
        assert!(engine.pressers(key).is_empty());
        assert_eq!(engine.press_strength(key), 0.0);
    }
    assert_eq!(engine.voices().live_count(), 0);
}
