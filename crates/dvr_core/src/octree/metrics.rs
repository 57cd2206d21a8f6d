//! Bottom-up metric passes.
//!
//! Every pass walks the arena in reverse id order, which visits all children
//! before their parent. Each field is assigned, never accumulated in place,
//! so running a pass twice with the same inputs gives identical values.

use super::node::OcNode;
use super::Octree;
use crate::config::CostModel;
use crate::region::Region;
use crate::transfer::OpacitySampler;
use crate::volume::{Layout, VoxelVolume};

/// Opacity totals over one leaf's voxels.
#[derive(Clone, Copy, Debug)]
struct LeafScan {
  sum: f64,
  zero: usize,
  count: usize,
}

impl LeafScan {
  fn ratio(&self) -> f32 {
    if self.count == 0 {
      0.0
    } else {
      (self.sum / self.count as f64) as f32
    }
  }
}

fn scan_leaf<S: OpacitySampler + ?Sized>(region: &Region, layout: &Layout, sampler: &S) -> LeafScan {
  let mut scan = LeafScan {
    sum: 0.0,
    zero: 0,
    count: region.voxel_count(),
  };
  for i in region.column..region.column + region.width {
    for j in region.row..region.row + region.height {
      let row_start = layout.linear(i, j, region.slab);
      for index in row_start..row_start + region.depth {
        let opacity = sampler.opacity(index);
        if opacity == 0.0 {
          scan.zero += 1;
        }
        scan.sum += opacity as f64;
      }
    }
  }
  scan
}

/// Physical volume of one voxel over the whole volume's, so that
/// `zero_count * voxel_share` is the node's empty share of the volume.
fn voxel_share(volume: &VoxelVolume) -> f32 {
  let scale = volume.scale();
  let total = volume.physical_volume();
  if total > 0.0 {
    scale.x * scale.y * scale.z / total
  } else {
    0.0
  }
}

/// Which visibility fields a pass writes.
#[derive(Clone, Copy)]
struct VisibilityFields {
  ratio: bool,
  empty_volume: bool,
}

impl Octree {
  /// Mean opacity per leaf, unweighted mean of the 8 children per internal
  /// node. Also refreshes `empty` and `empty_children`.
  pub fn compute_ratio_of_visibility<S: OpacitySampler + ?Sized>(&mut self, volume: &VoxelVolume, sampler: &S) {
    self.visibility_pass(
      volume,
      sampler,
      VisibilityFields {
        ratio: true,
        empty_volume: false,
      },
    );
  }

  /// Empty-volume percentage per node (summed over children for internal
  /// nodes), together with `empty` and `empty_children`.
  pub fn compute_empty_volume<S: OpacitySampler + ?Sized>(&mut self, volume: &VoxelVolume, sampler: &S) {
    self.visibility_pass(
      volume,
      sampler,
      VisibilityFields {
        ratio: false,
        empty_volume: true,
      },
    );
  }

  /// Rendering-cost bookkeeping. Reads `empty`, so run after one of the
  /// visibility passes.
  pub fn compute_rendering_cost(&mut self, costs: CostModel) {
    for index in (0..self.nodes.len()).rev() {
      let node = &self.nodes[index];
      let cost_structure = node.level as f32 * costs.cost_structure;
      let cost_render = if node.metrics.empty { 0.0 } else { 1.0 };

      let cost_to_render_children = match node.children {
        None => 8.0 * costs.cost_structure + costs.rendering_cost * 8.0,
        Some(children) => children
          .iter()
          .map(|child| {
            let child = &self.nodes[child.index()].metrics;
            child.cost_structure + costs.rendering_cost * child.cost_render
          })
          .sum(),
      };

      let metrics = &mut self.nodes[index].metrics;
      metrics.cost_structure = cost_structure;
      metrics.cost_render = cost_render;
      metrics.cost_to_render_children = cost_to_render_children;
      metrics.cost = (cost_structure + cost_render).min(cost_to_render_children);
    }
  }

  /// All metric families in one pass over the leaf voxels, then costs.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "octree::recompute"))]
  pub fn recompute<S: OpacitySampler + ?Sized>(&mut self, volume: &VoxelVolume, sampler: &S, costs: CostModel) {
    self.visibility_pass(
      volume,
      sampler,
      VisibilityFields {
        ratio: true,
        empty_volume: true,
      },
    );
    self.compute_rendering_cost(costs);
  }

  fn visibility_pass<S: OpacitySampler + ?Sized>(
    &mut self,
    volume: &VoxelVolume,
    sampler: &S,
    fields: VisibilityFields,
  ) {
    let layout = volume.layout();
    let share = voxel_share(volume);

    for index in (0..self.nodes.len()).rev() {
      let (ratio, percentage, empty_children, empty) = match self.nodes[index].children {
        None => {
          let scan = scan_leaf(&self.nodes[index].region, layout, sampler);
          let ratio = scan.ratio();
          (ratio, scan.zero as f32 * share, 0u8, ratio == 0.0)
        }
        Some(children) => {
          let mut ratio_sum = 0.0f32;
          let mut percentage = 0.0f32;
          let mut mask = 0u8;
          for (which, child) in children.iter().enumerate() {
            let child = &self.nodes[child.index()].metrics;
            ratio_sum += child.ratio_of_visibility;
            percentage += child.percentage_of_empty_volume;
            if child.empty {
              mask |= 1 << which;
            }
          }
          (ratio_sum / 8.0, percentage, mask, mask == 0xFF)
        }
      };

      let node: &mut OcNode = &mut self.nodes[index];
      if fields.ratio {
        node.metrics.ratio_of_visibility = ratio;
      }
      if fields.empty_volume {
        node.metrics.percentage_of_empty_volume = percentage;
      }
      node.metrics.empty_children = empty_children;
      node.metrics.empty = empty;
    }
  }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;
