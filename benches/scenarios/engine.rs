//! Benchmarks for engine ticks and key blending.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keyblend::{
    assets::{SampleBank, SampleBuffer},
    engine::{key_state::blend, Presser},
    playback::RecordingDevice,
    AgentId, Color, EngineConfig, KeyStateEngine, ManualClock,
};

const TICK_MS: f64 = 1_000.0;

fn engine() -> KeyStateEngine<RecordingDevice, ManualClock> {
    let mut engine =
        KeyStateEngine::with_clock(RecordingDevice::new(), EngineConfig::default(), ManualClock::new());
    engine.install_assets(SampleBank::uniform(SampleBuffer::new(
        vec![0.0; 48_000],
        1,
        48_000,
    )));
    engine
}

fn agent_color(i: usize) -> Color {
    Color::new((i * 40) as u8, 255 - (i * 30) as u8, 128)
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    // === IDLE ===
    // Nobody pressing anything; the cost of repainting 128 resting keys
    let mut idle = engine();
    group.bench_function("tick_idle", |b| b.iter(|| idle.tick(black_box(TICK_MS))));

    // === CROWDED ===
    // Every key held by several agents, half of them fading out. Ticking at
    // a fixed time keeps the stacks stable between iterations.
    for &agents in &[2usize, 8] {
        let mut crowded = engine();
        let ids: Vec<AgentId> = (0..agents).map(|i| AgentId::new(format!("agent-{}", i))).collect();
        for key in 0..keyblend::KEY_COUNT as u8 {
            for (i, id) in ids.iter().enumerate() {
                crowded.press(key, 0.8, id, agent_color(i));
            }
        }
        crowded.clock().set(TICK_MS - 100.0);
        for key in 0..keyblend::KEY_COUNT as u8 {
            for id in ids.iter().step_by(2) {
                crowded.release(key, id);
            }
        }
        crowded.tick(TICK_MS);

        group.bench_with_input(
            BenchmarkId::new("tick_crowded", agents),
            &agents,
            |b, _| b.iter(|| crowded.tick(black_box(TICK_MS))),
        );
    }

    // === BLEND ===
    // One deep stack with the base near the top, so every layer is painted
    for &depth in &[4usize, 16, 64] {
        let stack: Vec<Presser> = (0..depth)
            .map(|i| {
                let mut p = Presser::new(AgentId::new(format!("a{}", i)), agent_color(i), 1.0, 0.0);
                p.fade = if i == depth - 1 { 1.0 } else { 0.5 };
                p
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("blend", depth), &depth, |b, _| {
            b.iter(|| blend(black_box(Color::WHITE), black_box(&stack)))
        });
    }

    group.finish();
}
