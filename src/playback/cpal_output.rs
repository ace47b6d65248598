use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use tracing::{error, info};

use super::mixer::{Mixer, MixerCommand};
use super::{PlaybackDevice, PlaybackError};
use crate::assets::SampleBuffer;
use crate::dsp::automation::ReleaseShape;
use crate::synth::VoiceId;

/// Room for a full keyboard chord plus its releases and teardowns.
const COMMAND_QUEUE_SIZE: usize = 1024;

/// Plays voices on the default output device.
///
/// The stream lives as long as this value; dropping it stops all audio.
pub struct CpalPlayback {
    tx: Producer<MixerCommand>,
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: usize,
}

impl CpalPlayback {
    pub fn open_default() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoOutputDevice)?;
        let config = device.default_output_config()?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(PlaybackError::UnsupportedFormat(config.sample_format()));
        }

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let (tx, rx) = RingBuffer::<MixerCommand>::new(COMMAND_QUEUE_SIZE);
        let mut mixer = Mixer::new(rx, sample_rate as f32, channels);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| mixer.render(data),
            |err| error!("audio stream error: {}", err),
            None,
        )?;
        stream.play()?;

        info!(sample_rate, channels, "audio output started");

        Ok(Self {
            tx,
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    fn send(&mut self, command: MixerCommand) -> Result<(), PlaybackError> {
        self.tx.push(command).map_err(|_| PlaybackError::QueueFull)
    }
}

impl PlaybackDevice for CpalPlayback {
    fn start(
        &mut self,
        id: VoiceId,
        sample: &SampleBuffer,
        gain: f32,
    ) -> Result<(), PlaybackError> {
        self.send(MixerCommand::Start {
            id,
            sample: sample.clone(),
            gain,
        })
    }

    fn release(&mut self, id: VoiceId, shape: ReleaseShape) -> Result<(), PlaybackError> {
        self.send(MixerCommand::Release { id, shape })
    }

    fn stop(&mut self, id: VoiceId) -> Result<(), PlaybackError> {
        self.send(MixerCommand::Stop { id })
    }
}
