use rtrb::Consumer;

use crate::assets::SampleBuffer;
use crate::dsp::amplify::multiply_in_place;
use crate::dsp::automation::{GainAutomation, ReleaseShape};
use crate::dsp::mix::{soft_limit_in_place, sum_in_place};
use crate::synth::VoiceId;
use crate::{KEY_COUNT, MAX_BLOCK_SIZE};

/// Sources the mixer holds at once. A start beyond this steals the oldest.
pub const MAX_SOURCES: usize = KEY_COUNT * 2;

/// Commands sent from the engine thread to the audio thread.
pub enum MixerCommand {
    Start {
        id: VoiceId,
        sample: SampleBuffer,
        gain: f32,
    },
    Release {
        id: VoiceId,
        shape: ReleaseShape,
    },
    Stop {
        id: VoiceId,
    },
}

struct Source {
    id: VoiceId,
    sample: SampleBuffer,
    position: f64, // in source frames
    step: f64,     // source frames per output frame
    automation: GainAutomation,
}

impl Source {
    fn finished(&self) -> bool {
        self.position >= self.sample.frames() as f64
    }
}

/// Audio-thread side of the playback device.
///
/// Sums every playing source into a bus, resampling each one to the output
/// rate with linear interpolation, and soft-limits the result.
pub struct Mixer {
    rx: Consumer<MixerCommand>,
    sources: Vec<Source>,
    sample_rate: f32,
    channels: usize,
    bus: Vec<Vec<f32>>,
    scratch: Vec<f32>,
    gains: Vec<f32>,
}

impl Mixer {
    pub fn new(rx: Consumer<MixerCommand>, sample_rate: f32, channels: usize) -> Self {
        let channels = channels.max(1);
        Self {
            rx,
            sources: Vec::with_capacity(MAX_SOURCES),
            sample_rate,
            channels,
            bus: vec![vec![0.0; MAX_BLOCK_SIZE]; channels],
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            gains: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Number of sources currently playing
    pub fn active_sources(&self) -> usize {
        self.sources.len()
    }

    /// Render interleaved output. `out.len()` must be a multiple of the
    /// channel count.
    pub fn render(&mut self, out: &mut [f32]) {
        self.apply_commands();

        let total_frames = out.len() / self.channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            self.render_block(frames);

            // Interleave the bus into the output
            let out_off = frames_written * self.channels;
            for (ch, bus) in self.bus.iter().enumerate() {
                for (i, &s) in bus[..frames].iter().enumerate() {
                    out[out_off + i * self.channels + ch] = s;
                }
            }

            frames_written += frames;
        }

        self.sources.retain(|source| !source.finished());
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.rx.pop() {
            match command {
                MixerCommand::Start { id, sample, gain } => {
                    let step = sample.sample_rate() as f64 / self.sample_rate as f64;
                    // Never grow on the audio thread
                    if self.sources.len() >= MAX_SOURCES {
                        self.sources.remove(0);
                    }
                    self.sources.push(Source {
                        id,
                        sample,
                        position: 0.0,
                        step,
                        automation: GainAutomation::new(gain),
                    });
                }
                MixerCommand::Release { id, shape } => {
                    if let Some(source) = self.sources.iter_mut().find(|s| s.id == id) {
                        source.automation.release(&shape, self.sample_rate);
                    }
                }
                MixerCommand::Stop { id } => {
                    self.sources.retain(|s| s.id != id);
                }
            }
        }
    }

    fn render_block(&mut self, frames: usize) {
        for bus in &mut self.bus {
            bus[..frames].fill(0.0);
        }

        for source in &mut self.sources {
            if source.finished() {
                continue;
            }

            let gains = &mut self.gains[..frames];
            source.automation.render(gains);

            for (ch, bus) in self.bus.iter_mut().enumerate() {
                let block = &mut self.scratch[..frames];
                let mut position = source.position;
                for s in block.iter_mut() {
                    *s = interpolate(&source.sample, position, ch);
                    position += source.step;
                }
                multiply_in_place(block, gains);
                sum_in_place(&mut bus[..frames], block);
            }

            source.position += source.step * frames as f64;
        }

        for bus in &mut self.bus {
            soft_limit_in_place(&mut bus[..frames]);
        }
    }
}

#[inline]
fn interpolate(sample: &SampleBuffer, position: f64, channel: usize) -> f32 {
    let frame = position as usize;
    let frac = (position - frame as f64) as f32;
    let a = sample.sample(frame, channel);
    let b = sample.sample(frame + 1, channel);
    a + (b - a) * frac
}
