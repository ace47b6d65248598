//! Benchmarks for the audio-thread mixer.
//!
//! Each iteration renders one stereo callback with a fresh set of sources,
//! so sources never run out mid-measurement.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use keyblend::{
    assets::{SampleBuffer, ToneBank},
    dsp::automation::ReleaseShape,
    playback::{Mixer, MixerCommand},
    synth::VoiceId,
};
use rtrb::RingBuffer;

use crate::BLOCK_SIZES;

const CHANNELS: usize = 2;

fn mixer_with(voices: usize, sample: &SampleBuffer, released: bool) -> Mixer {
    let (mut tx, rx) = RingBuffer::new(voices * 2);
    for i in 0..voices {
        let id = VoiceId::new(i as u64);
        let _ = tx.push(MixerCommand::Start {
            id,
            sample: sample.clone(),
            gain: 0.3,
        });
        if released {
            let _ = tx.push(MixerCommand::Release {
                id,
                shape: ReleaseShape::new(50.0, 300.0, 0.0001),
            });
        }
    }
    Mixer::new(rx, 48_000.0, CHANNELS)
}

pub fn bench_mixer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mixer");

    // 32kHz samples force rate conversion on a 48kHz bus
    let sample = ToneBank::new().with_sample_rate(32_000).render(60);

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size * CHANNELS];

        for &(voices, released) in &[(4usize, false), (16, false), (16, true)] {
            let name = if released {
                format!("releasing_{}", voices)
            } else {
                format!("voices_{}", voices)
            };
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter_batched_ref(
                    || mixer_with(voices, &sample, released),
                    |mixer| mixer.render(black_box(&mut out)),
                    BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}
