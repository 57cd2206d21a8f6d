//! Scene - tiles the volume into bricks and drives them per transfer-function
//! change and per frame.
//!
//! # Tiling
//!
//! ```text
//! axis of 70 voxels, texture_size 32:
//!   [0, 32) [32, 64) [64, 70)
//! ```
//!
//! Each axis gets `ceil(size / texture_size)` bricks of `texture_size`
//! voxels; the last one takes the remainder.

use glam::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use web_time::Instant;

use crate::brick::{Brick, DrawableNode};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::metrics::SceneMetrics;
use crate::octree::{sort_back_to_front, SelectionPolicy};
use crate::region::Region;
use crate::transfer::{OpacitySampler, TransferFunction};
use crate::volume::{Layout, VoxelVolume};

/// Start and length of each tile along one axis.
fn tile_axis(size: usize, texture_size: usize) -> impl Iterator<Item = (usize, usize)> {
  (0..size.div_ceil(texture_size)).map(move |n| {
    let start = n * texture_size;
    (start, texture_size.min(size - start))
  })
}

/// Brick regions covering a volume of `size`, X outermost.
pub fn tile_regions(size: [usize; 3], texture_size: usize) -> Result<Vec<Region>> {
  if texture_size == 0 {
    return Err(Error::InvalidConfig("texture_size must be non-zero".into()));
  }
  let mut regions = Vec::new();
  for (column, width) in tile_axis(size[0], texture_size) {
    for (row, height) in tile_axis(size[1], texture_size) {
      for (slab, depth) in tile_axis(size[2], texture_size) {
        regions.push(Region::new(column, row, slab, width, height, depth));
      }
    }
  }
  Ok(regions)
}

/// Tile `volume` and build every brick's octree.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "scene::create_bricks"))]
pub fn create_bricks(volume: &VoxelVolume, config: &RenderConfig) -> Result<Vec<Brick>> {
  let regions = tile_regions(volume.size(), config.texture_size)?;
  Ok(
    regions
      .into_iter()
      .map(|region| Brick::new(volume, region, config.leaf_size))
      .collect(),
  )
}

/// Renderer input for one frame.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Frame {
  pub viewer: Vec3,
  /// Brick indices, back-to-front.
  pub brick_order: Vec<usize>,
  /// Selected nodes of every non-empty brick, back-to-front.
  pub drawables: Vec<DrawableNode>,
  /// Per brick (scene order): nothing to draw.
  pub brick_empty: Vec<bool>,
}

/// All bricks of one volume plus the active configuration.
#[derive(Debug)]
pub struct Scene {
  /// Layout of the volume the bricks were tiled from.
  layout: Layout,
  config: RenderConfig,
  policy: SelectionPolicy,
  bricks: Vec<Brick>,
  metrics: SceneMetrics,
}

impl Scene {
  /// Validate `config`, resolve its policy and build all bricks.
  ///
  /// Metrics start zeroed, so nothing is drawn until the first
  /// [`update_transfer_function`](Scene::update_transfer_function).
  pub fn new(volume: &VoxelVolume, config: RenderConfig) -> Result<Self> {
    config.validate()?;
    let policy = config.selection_policy()?;
    let bricks = create_bricks(volume, &config)?;

    let nodes: usize = bricks.iter().map(|b| b.octree().len()).sum();
    tracing::info!(
      size = ?volume.size(),
      texture_size = config.texture_size,
      bricks = bricks.len(),
      nodes,
      ?policy,
      "built scene"
    );

    let mut metrics = SceneMetrics::new();
    metrics.record_scene(bricks.len(), nodes);

    Ok(Self {
      layout: *volume.layout(),
      config,
      policy,
      bricks,
      metrics,
    })
  }

  pub fn config(&self) -> &RenderConfig {
    &self.config
  }

  pub fn policy(&self) -> SelectionPolicy {
    self.policy
  }

  pub fn bricks(&self) -> &[Brick] {
    &self.bricks
  }

  pub fn brick_mut(&mut self, index: usize) -> Option<&mut Brick> {
    self.bricks.get_mut(index)
  }

  pub fn metrics(&self) -> &SceneMetrics {
    &self.metrics
  }

  /// Bind `tf` to `volume` and recompute every brick.
  ///
  /// `volume` must have the layout the scene was built from.
  pub fn update_transfer_function(&mut self, volume: &VoxelVolume, tf: &TransferFunction) -> Result<()> {
    self.check_layout(volume)?;
    let lookup = tf.bind(volume)?;
    self.recompute_with(volume, &lookup)
  }

  /// Recompute every brick's metrics from an arbitrary opacity sampler, then
  /// rerun the bounded-queue pre-pass if that policy is active.
  ///
  /// Fails with `InvalidDimensions`, leaving all metrics untouched, when
  /// `volume` was resized or replaced since [`Scene::new`].
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "scene::recompute"))]
  pub fn recompute_with<S: OpacitySampler + Sync + ?Sized>(&mut self, volume: &VoxelVolume, sampler: &S) -> Result<()> {
    self.check_layout(volume)?;
    let start = Instant::now();
    let costs = self.config.cost_model();

    #[cfg(feature = "parallel")]
    self
      .bricks
      .par_iter_mut()
      .for_each(|brick| brick.recompute_metrics(volume, sampler, costs));

    #[cfg(not(feature = "parallel"))]
    for brick in &mut self.bricks {
      brick.recompute_metrics(volume, sampler, costs);
    }

    self.run_queue_prepass();

    let empty = self.bricks.iter().filter(|b| b.is_empty()).count();
    if empty == self.bricks.len() {
      tracing::warn!(bricks = empty, "every brick is empty under this transfer function");
    } else {
      tracing::debug!(bricks = self.bricks.len(), empty, "recomputed scene");
    }
    self
      .metrics
      .record_recompute(start.elapsed().as_micros() as u64, empty);
    Ok(())
  }

  fn check_layout(&self, volume: &VoxelVolume) -> Result<()> {
    if volume.layout() != &self.layout {
      tracing::warn!(
        expected = ?self.layout.size(),
        actual = ?volume.size(),
        "volume layout changed since the scene was built"
      );
      return Err(Error::InvalidDimensions {
        size: volume.size(),
        border: volume.border_size(),
      });
    }
    Ok(())
  }

  fn run_queue_prepass(&mut self) {
    if let SelectionPolicy::BoundedQueue(max) = self.policy {
      for brick in &mut self.bricks {
        brick.determine_oc_nodes_to_display(max);
      }
    }
  }

  /// Switch the active policy. Takes effect on the next frame.
  ///
  /// A ratio threshold outside [0, 1] is rejected and the current policy
  /// kept.
  pub fn set_policy(&mut self, policy: SelectionPolicy) -> Result<()> {
    let mut config = self.config.clone();
    config.set_selection_policy(policy);
    config.validate()?;
    self.config = config;
    self.policy = policy;
    self.run_queue_prepass();
    Ok(())
  }

  /// Toggle the down-sampled fast path on every brick.
  pub fn set_interactive(&mut self, interactive: bool) {
    for brick in &mut self.bricks {
      brick.set_interactive(interactive);
    }
  }

  /// Brick indices ordered back-to-front for `viewer`.
  pub fn sorted_bricks(&self, viewer: Vec3) -> Vec<usize> {
    let mut order: Vec<usize> = (0..self.bricks.len()).collect();
    sort_back_to_front(&mut order, viewer, |&index| self.bricks[index].bounding_box());
    order
  }

  /// Select and order everything to draw for `viewer`.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "scene::frame"))]
  pub fn frame(&mut self, viewer: Vec3) -> Frame {
    let start = Instant::now();
    let brick_order = self.sorted_bricks(viewer);

    let mut drawables = Vec::new();
    for &index in &brick_order {
      self.bricks[index].select_nodes_into(
        index,
        &self.policy,
        viewer,
        self.config.slice_factor,
        &mut drawables,
      );
    }

    let frame = Frame {
      viewer,
      brick_order,
      drawables,
      brick_empty: self.bricks.iter().map(Brick::is_empty).collect(),
    };
    tracing::trace!(nodes = frame.drawables.len(), "selected frame");
    self.metrics.record_frame(&frame, start.elapsed().as_micros() as u64);
    frame
  }
}

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;
