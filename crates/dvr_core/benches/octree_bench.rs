//! Octree build, metric recompute and frame selection over synthetic
//! volumes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dvr_core::{synthetic, Octree, Region, RenderConfig, Scene, SelectionPolicy, TransferFunction};
use glam::Vec3;

const SIZES: [usize; 3] = [32, 64, 128];

fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree::build");
  for size in SIZES {
    let region = Region::from_size([size; 3]);
    let volume_box = dvr_core::BoundingBox::new(Vec3::ZERO, Vec3::splat(size as f32));
    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
      b.iter(|| black_box(Octree::new(region, volume_box, 4)))
    });
  }
  group.finish();
}

fn bench_recompute(c: &mut Criterion) {
  let mut group = c.benchmark_group("scene::recompute");
  let tf = TransferFunction::ramp(60, 200);
  for size in SIZES {
    let volume = synthetic::sphere([size; 3], 0.8, 220, 10).unwrap();
    let mut scene = Scene::new(&volume, RenderConfig::default()).unwrap();
    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
      b.iter(|| scene.update_transfer_function(black_box(&volume), &tf).unwrap())
    });
  }
  group.finish();
}

fn bench_frame(c: &mut Criterion) {
  let volume = synthetic::shells([128; 3], 5, 240, 0).unwrap();
  let viewer = Vec3::new(-60.0, 30.0, 200.0);

  let mut group = c.benchmark_group("scene::frame (128³ shells)");
  for (name, policy) in [
    ("ratio", SelectionPolicy::RatioThreshold(0.9)),
    ("queue", SelectionPolicy::BoundedQueue(64)),
    ("cost", SelectionPolicy::CostFunction),
  ] {
    let mut scene = Scene::new(&volume, RenderConfig::default()).unwrap();
    scene
      .update_transfer_function(&volume, &TransferFunction::step(128))
      .unwrap();
    scene.set_policy(policy).unwrap();
    group.bench_function(name, |b| b.iter(|| black_box(scene.frame(black_box(viewer)))));
  }
  group.finish();
}

criterion_group!(benches, bench_build, bench_recompute, bench_frame);
criterion_main!(benches);
