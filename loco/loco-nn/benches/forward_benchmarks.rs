//! Benchmarks for the network forward pass.
//!
//! Run with: `cargo bench -p loco-nn`
//!
//! Measures one `compute` call per iteration for each interpolation mode and
//! a range of hidden layer widths. Blended modes pay for the parameter blend
//! on top of the three affine layers.

#![allow(missing_docs, clippy::cast_precision_loss, clippy::unwrap_used)]

use std::f32::consts::TAU;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use loco_nn::{InferenceEngine, InterpolationMode, NetworkConfig};

fn bench_engine(hidden: usize, mode: InterpolationMode) -> InferenceEngine {
    InferenceEngine::zeros(NetworkConfig::with_sizes(342, 311, hidden).mode(mode)).unwrap()
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_constant");

    for &hidden in &[64, 128, 256, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(hidden), &hidden, |b, &hidden| {
            let engine = bench_engine(hidden, InterpolationMode::Constant);
            let mut scratch = engine.scratch();
            for (i, v) in scratch.x.as_mut_slice().iter_mut().enumerate() {
                *v = (i as f32 * 0.01).sin();
            }
            let mut phase = 0.0f32;

            b.iter(|| {
                engine.compute(&mut scratch, phase).unwrap();
                phase = (phase + 0.05) % TAU;
            });
        });
    }

    group.finish();
}

fn bench_interpolation_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_mode");

    for (name, mode) in [
        ("constant", InterpolationMode::Constant),
        ("linear", InterpolationMode::Linear),
        ("cubic", InterpolationMode::Cubic),
    ] {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            let engine = bench_engine(512, mode);
            let mut scratch = engine.scratch();
            let mut phase = 0.0f32;

            b.iter(|| {
                engine.compute(&mut scratch, phase).unwrap();
                phase = (phase + 0.05) % TAU;
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_forward, bench_interpolation_modes);
criterion_main!(benches);
