//! Engine-agnostic scene statistics.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use dvr_core::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Scene records itself:
//! let frame = scene.frame(viewer);
//! println!("{} nodes drawn", scene.metrics().nodes_drawn);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::scene::Frame;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Deepest octree level tracked individually; deeper levels share the last
/// slot.
pub const MAX_TRACKED_LEVELS: usize = 16;

/// Timings kept per window.
const TIMING_WINDOW: usize = 128;

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Most recent `capacity` timings in microseconds, oldest evicted first.
#[derive(Debug, Clone)]
pub struct TimingWindow {
  samples: VecDeque<u64>,
  capacity: usize,
}

impl TimingWindow {
  pub fn new(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn push(&mut self, us: u64) {
    if self.samples.len() >= self.capacity {
      self.samples.pop_front();
    }
    self.samples.push_back(us);
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn clear(&mut self) {
    self.samples.clear();
  }

  /// Mean over the window, 0 when empty.
  pub fn average(&self) -> f64 {
    if self.samples.is_empty() {
      return 0.0;
    }
    self.samples.iter().sum::<u64>() as f64 / self.samples.len() as f64
  }
}

/// Scene-level statistics, updated on recompute and on every frame.
#[derive(Debug, Clone)]
pub struct SceneMetrics {
  // Structure
  pub bricks_total: u32,
  /// Bricks with nothing visible after the last recompute.
  pub bricks_empty: u32,
  /// Octree nodes over all bricks.
  pub nodes_total: u64,

  // Last frame
  pub nodes_drawn: u32,
  /// Drawn nodes per octree level (index = level).
  pub drawn_per_level: [u32; MAX_TRACKED_LEVELS],

  // Timing
  /// Rolling window of recompute times in microseconds.
  pub recompute_timings: TimingWindow,
  /// Rolling window of frame selection times in microseconds.
  pub selection_timings: TimingWindow,
  pub last_recompute_us: u64,
  pub last_selection_us: u64,
  /// Recomputes this session.
  pub total_recomputes: u64,
}

impl Default for SceneMetrics {
  fn default() -> Self {
    Self {
      bricks_total: 0,
      bricks_empty: 0,
      nodes_total: 0,
      nodes_drawn: 0,
      drawn_per_level: [0; MAX_TRACKED_LEVELS],
      recompute_timings: TimingWindow::new(TIMING_WINDOW),
      selection_timings: TimingWindow::new(TIMING_WINDOW),
      last_recompute_us: 0,
      last_selection_us: 0,
      total_recomputes: 0,
    }
  }
}

impl SceneMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Reset per-frame and timing data.
  pub fn reset(&mut self) {
    self.bricks_empty = 0;
    self.nodes_drawn = 0;
    self.drawn_per_level.fill(0);
    self.recompute_timings.clear();
    self.selection_timings.clear();
    self.last_recompute_us = 0;
    self.last_selection_us = 0;
    // Structure and total_recomputes are kept
  }

  /// Record the brick and node counts of a freshly built scene.
  pub fn record_scene(&mut self, bricks: usize, nodes: usize) {
    if is_enabled() {
      self.bricks_total = bricks as u32;
      self.nodes_total = nodes as u64;
    }
  }

  /// Record a metric recompute over all bricks.
  pub fn record_recompute(&mut self, timing_us: u64, bricks_empty: usize) {
    if is_enabled() {
      self.recompute_timings.push(timing_us);
      self.last_recompute_us = timing_us;
      self.bricks_empty = bricks_empty as u32;
      self.total_recomputes += 1;
    }
  }

  /// Record the selection result of one frame.
  pub fn record_frame(&mut self, frame: &Frame, timing_us: u64) {
    if !is_enabled() {
      return;
    }
    self.selection_timings.push(timing_us);
    self.last_selection_us = timing_us;
    self.nodes_drawn = frame.drawables.len() as u32;
    self.drawn_per_level.fill(0);
    for node in &frame.drawables {
      let level = (node.level as usize).min(MAX_TRACKED_LEVELS - 1);
      self.drawn_per_level[level] += 1;
    }
  }

  pub fn avg_recompute_timing_us(&self) -> f64 {
    self.recompute_timings.average()
  }

  pub fn avg_selection_timing_us(&self) -> f64 {
    self.selection_timings.average()
  }

  /// Share of all octree nodes drawn in the last frame.
  pub fn drawn_fraction(&self) -> f64 {
    if self.nodes_total == 0 {
      0.0
    } else {
      self.nodes_drawn as f64 / self.nodes_total as f64
    }
  }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
  use glam::Vec3;

  use super::*;
  use crate::bounds::BoundingBox;
  use crate::brick::DrawableNode;
  use crate::octree::NodeId;

  fn drawable(level: u32) -> DrawableNode {
    DrawableNode {
      brick: 0,
      node: NodeId::ROOT,
      level,
      volume_box: BoundingBox::UNIT,
      corners: BoundingBox::UNIT.corners(),
      texture_box: BoundingBox::UNIT,
      texture_corners: BoundingBox::UNIT.corners(),
      delta: 1.0,
    }
  }

  #[test]
  fn test_timing_window_evicts_oldest() {
    let mut window = TimingWindow::new(3);
    assert!(window.is_empty());
    assert_eq!(window.average(), 0.0);

    window.push(10);
    window.push(20);
    window.push(30);
    assert_eq!(window.len(), 3);
    assert_eq!(window.average(), 20.0);

    window.push(40);
    assert_eq!(window.len(), 3);
    assert_eq!(window.average(), 30.0);
  }

  #[test]
  fn test_frame_recording() {
    let mut metrics = SceneMetrics::new();
    metrics.record_scene(2, 18);

    let frame = Frame {
      viewer: Vec3::ZERO,
      brick_order: vec![1, 0],
      drawables: vec![drawable(0), drawable(1), drawable(1), drawable(40)],
      brick_empty: vec![false, false],
    };
    metrics.record_frame(&frame, 250);

    assert_eq!(metrics.nodes_drawn, 4);
    assert_eq!(metrics.drawn_per_level[0], 1);
    assert_eq!(metrics.drawn_per_level[1], 2);
    assert_eq!(metrics.drawn_per_level[MAX_TRACKED_LEVELS - 1], 1);
    assert_eq!(metrics.last_selection_us, 250);
    assert!((metrics.drawn_fraction() - 4.0 / 18.0).abs() < 1e-12);
  }

  #[test]
  fn test_recompute_recording() {
    let mut metrics = SceneMetrics::new();
    metrics.record_recompute(1000, 3);
    metrics.record_recompute(3000, 1);

    assert_eq!(metrics.total_recomputes, 2);
    assert_eq!(metrics.bricks_empty, 1);
    assert_eq!(metrics.avg_recompute_timing_us(), 2000.0);

    metrics.reset();
    assert!(metrics.recompute_timings.is_empty());
    assert_eq!(metrics.total_recomputes, 2);
  }
}
