//! Benchmarks for the per-sample release automation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keyblend::dsp::automation::{GainAutomation, ReleaseShape};

use crate::BLOCK_SIZES;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");
    let shape = ReleaseShape::new(50.0, 300.0, 0.0001);

    for &size in BLOCK_SIZES {
        let mut gains = vec![0.0f32; size];

        // Steady: the common case, nothing released
        let mut steady = GainAutomation::new(0.3);
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, _| {
            b.iter(|| steady.render(black_box(&mut gains)))
        });

        // Ramp: restart the release each time so we stay on the slope
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| {
                let mut auto = GainAutomation::new(0.3);
                auto.release(&shape, 48_000.0);
                auto.render(black_box(&mut gains));
            })
        });
    }

    group.finish();
}
