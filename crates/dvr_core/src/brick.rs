//! Brick - one texture-sized tile of the volume and its octree.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::bounds::{BoundingBox, BoundingSphere};
use crate::config::CostModel;
use crate::error::{Error, Result};
use crate::octree::{NodeId, OcNode, Octree, SelectionPolicy};
use crate::region::Region;
use crate::transfer::OpacitySampler;
use crate::volume::VoxelVolume;

/// Volume axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
  X,
  Y,
  Z,
}

impl Axis {
  pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

  #[inline]
  pub fn index(self) -> usize {
    match self {
      Axis::X => 0,
      Axis::Y => 1,
      Axis::Z => 2,
    }
  }
}

/// An axis-aligned slice the renderer should draw through a brick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SlicePlane {
  pub axis: Axis,
  /// Brick-local voxel index along `axis`.
  pub index: usize,
  /// World-space coordinate of the plane along `axis`.
  pub world: f32,
  /// Texture coordinate of the voxel center along `axis`.
  pub texture: f32,
}

/// One node handed to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrawableNode {
  /// Index of the owning brick in the scene.
  pub brick: usize,
  pub node: NodeId,
  pub level: u32,
  pub volume_box: BoundingBox,
  /// World corners, bit 0 = X, bit 1 = Y, bit 2 = Z.
  pub corners: [Vec3; 8],
  pub texture_box: BoundingBox,
  pub texture_corners: [Vec3; 8],
  /// Slice step: box diagonal over `max_extent * slice_factor`.
  pub delta: f32,
}

impl DrawableNode {
  pub fn new(brick: usize, id: NodeId, node: &OcNode, slice_factor: f32, interactive: bool) -> Self {
    let extent = node.region.max_extent().max(1) as f32;
    let mut delta = node.volume_box.diagonal() / (extent * slice_factor);
    if interactive {
      delta *= 2.0;
    }
    Self {
      brick,
      node: id,
      level: node.level,
      volume_box: node.volume_box,
      corners: node.volume_box.corners(),
      texture_box: node.texture_box,
      texture_corners: node.texture_box.corners(),
      delta,
    }
  }
}

/// Texture-sized tile of the volume with its own octree.
#[derive(Clone, Debug)]
pub struct Brick {
  region: Region,
  octree: Octree,
  bounding_box: BoundingBox,
  bounding_sphere: BoundingSphere,
  empty: bool,
  slices: [Option<usize>; 3],
  interactive: bool,
  down_sampling_changed: bool,
}

/// World box of `region`: the volume box scaled by the region's fractional
/// position inside the volume.
fn world_box(volume: &VoxelVolume, region: &Region) -> BoundingBox {
  let size = volume.size();
  let fraction = |offset: [usize; 3]| {
    Vec3::new(
      offset[0] as f32 / size[0] as f32,
      offset[1] as f32 / size[1] as f32,
      offset[2] as f32 / size[2] as f32,
    )
  };
  let start = region.offset();
  let [w, h, d] = region.size();
  let end = [start[0] + w, start[1] + h, start[2] + d];
  BoundingBox::new(
    volume.origin() + volume.extent() * fraction(start),
    volume.origin() + volume.extent() * fraction(end),
  )
}

impl Brick {
  /// Tile `region` of `volume` and build its octree.
  pub fn new(volume: &VoxelVolume, region: Region, leaf_size: usize) -> Self {
    let bounding_box = world_box(volume, &region);
    Self {
      region,
      octree: Octree::new(region, bounding_box, leaf_size),
      bounding_box,
      bounding_sphere: BoundingSphere::from_box(&bounding_box),
      empty: false,
      slices: [None; 3],
      interactive: false,
      down_sampling_changed: false,
    }
  }

  #[inline]
  pub fn region(&self) -> &Region {
    &self.region
  }

  #[inline]
  pub fn octree(&self) -> &Octree {
    &self.octree
  }

  pub fn bounding_box(&self) -> BoundingBox {
    self.bounding_box
  }

  pub fn bounding_sphere(&self) -> BoundingSphere {
    self.bounding_sphere
  }

  /// World-space center of the brick.
  pub fn center(&self) -> Vec3 {
    self.bounding_box.center()
  }

  /// True when no voxel of the brick is visible under the current transfer
  /// function. The renderer skips empty bricks entirely.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.empty
  }

  /// Recompute every octree metric and refresh the empty flag.
  pub fn recompute_metrics<S: OpacitySampler + ?Sized>(&mut self, volume: &VoxelVolume, sampler: &S, costs: CostModel) {
    self.octree.recompute(volume, sampler, costs);
    let root = self.octree.root_node();
    self.empty = root.metrics.empty;
    tracing::debug!(
      region = ?self.region.offset(),
      nodes = self.octree.len(),
      ratio = root.metrics.ratio_of_visibility,
      empty = self.empty,
      "recomputed brick metrics"
    );
  }

  /// Bounded-queue pre-pass; marks the brick empty when its root has no
  /// visible voxels.
  pub fn determine_oc_nodes_to_display(&mut self, max_queue_size: usize) -> bool {
    let visible = self.octree.mark_displayed_by_queue(max_queue_size);
    if !visible {
      self.empty = true;
    }
    visible
  }

  /// Append this brick's drawable nodes, back-to-front for `viewer`.
  pub fn select_nodes_into(
    &self,
    brick: usize,
    policy: &SelectionPolicy,
    viewer: Vec3,
    slice_factor: f32,
    out: &mut Vec<DrawableNode>,
  ) {
    if self.empty {
      return;
    }
    let mut ids = Vec::new();
    self.octree.select_into(policy, viewer, &mut ids);
    out.extend(ids.into_iter().map(|id| {
      DrawableNode::new(brick, id, self.octree.node(id), slice_factor, self.interactive)
    }));
  }

  pub fn select_nodes(
    &self,
    brick: usize,
    policy: &SelectionPolicy,
    viewer: Vec3,
    slice_factor: f32,
  ) -> Vec<DrawableNode> {
    let mut out = Vec::new();
    self.select_nodes_into(brick, policy, viewer, slice_factor, &mut out);
    out
  }

  /// Show a slice at brick-local `index` along `axis`, or hide it with
  /// `None`.
  pub fn set_slice(&mut self, axis: Axis, index: Option<usize>) -> Result<()> {
    let size = self.region.size();
    if let Some(index) = index {
      if index >= size[axis.index()] {
        let mut at = [0; 3];
        at[axis.index()] = index;
        return Err(Error::IndexOutOfBounds { index: at, size });
      }
    }
    self.slices[axis.index()] = index;
    Ok(())
  }

  pub fn slice(&self, axis: Axis) -> Option<usize> {
    self.slices[axis.index()]
  }

  /// Planes of the slices currently shown, in X, Y, Z order.
  pub fn active_slices(&self) -> Vec<SlicePlane> {
    let size = self.region.size();
    Axis::ALL
      .into_iter()
      .filter_map(|axis| {
        let index = self.slices[axis.index()]?;
        let a = axis.index();
        let texture = (index as f32 + 0.5) / size[a] as f32;
        let world = self.bounding_box.min[a] + self.bounding_box.size()[a] * texture;
        Some(SlicePlane {
          axis,
          index,
          world,
          texture,
        })
      })
      .collect()
  }

  /// Switch the down-sampled fast path on or off.
  pub fn set_interactive(&mut self, interactive: bool) {
    if self.interactive != interactive {
      self.interactive = interactive;
      self.down_sampling_changed = true;
    }
  }

  pub fn is_interactive(&self) -> bool {
    self.interactive
  }

  /// Whether interactive mode flipped since the last call; clears the flag.
  pub fn take_down_sampling_changed(&mut self) -> bool {
    std::mem::take(&mut self.down_sampling_changed)
  }
}

#[cfg(test)]
#[path = "brick_test.rs"]
mod brick_test;
