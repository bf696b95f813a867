//! Benchmarks for per-character frame cost and batch throughput.
//!
//! Run with: `cargo bench -p loco-core --features parallel`

#![allow(
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_precision_loss
)]

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use loco_core::{CharacterBatch, TrajectoryController};
use loco_nn::{InferenceEngine, NetworkConfig};
use loco_terrain::{BoxObstacle, FlatGround, TerrainScene};
use loco_types::{LocomotionConfig, MovementIntent, WallSegment};
use nalgebra::{Vector2, Vector3};

const DT: f32 = 1.0 / 60.0;

/// Full-size zero engine: the forward pass costs the same as a trained one.
fn bench_engine() -> Arc<InferenceEngine> {
    Arc::new(InferenceEngine::zeros(NetworkConfig::default()).unwrap())
}

fn bench_scene() -> TerrainScene {
    TerrainScene::new(FlatGround::new(0.0)).with_obstacle(
        BoxObstacle::from_corners(Vector3::new(-2.0, 0.0, 8.0), Vector3::new(2.0, 2.0, 9.0))
            .unwrap(),
    )
}

fn bench_frame(c: &mut Criterion) {
    let scene = bench_scene();
    let mut group = c.benchmark_group("controller_frame");

    for &walls in &[0usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("move_character", walls), &walls, |b, &walls| {
            let mut character =
                TrajectoryController::new(bench_engine(), LocomotionConfig::default()).unwrap();
            for i in 0..walls {
                let x = i as f32 * 0.5;
                character
                    .add_wall(WallSegment::new(Vector2::new(x, 4.0), Vector2::new(x + 0.4, 4.0)).unwrap())
                    .unwrap();
            }
            let intent = MovementIntent::forward();
            b.iter(|| character.move_character(black_box(&intent), &scene));
        });
    }

    group.bench_function("step_network", |b| {
        let mut character =
            TrajectoryController::new(bench_engine(), LocomotionConfig::default()).unwrap();
        b.iter(|| character.step_network(&scene).unwrap());
    });

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let scene = bench_scene();
    let engine = bench_engine();
    let mut group = c.benchmark_group("batch_advance_all");

    for &n in &[1usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut batch = CharacterBatch::new(Arc::clone(&engine), LocomotionConfig::default(), n)
                .unwrap();
            let intents = vec![MovementIntent::forward(); n];
            b.iter(|| {
                let _errors = batch.advance_all(&intents, DT, &scene);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame, bench_batch);
criterion_main!(benches);
