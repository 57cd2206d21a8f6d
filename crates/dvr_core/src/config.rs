//! Render configuration shared by bricks, octrees and the scene.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::octree::SelectionPolicy;

/// Weights of the rendering-cost heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
  /// Cost per octree level of reaching a node.
  pub cost_structure: f32,
  /// Cost of drawing one non-empty node.
  pub rendering_cost: f32,
}

impl Default for CostModel {
  fn default() -> Self {
    Self {
      cost_structure: 0.1,
      rendering_cost: 1.0,
    }
  }
}

/// Scene-wide configuration.
///
/// Deserializes from partial input; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
  /// Minimum node half-extent in voxels. The octree never goes below 4
  /// regardless.
  pub leaf_size: usize,
  /// Maximum brick edge in voxels. Must be a power of two.
  pub texture_size: usize,
  pub ratio_of_visibility_threshold: f32,
  /// Slices per voxel along the node's longest axis.
  pub slice_factor: f32,
  pub maximum_priority_queue_size: usize,
  pub cost_structure: f32,
  pub rendering_cost: f32,
  pub ratio_of_visibility_test: bool,
  pub maximum_priority_queue_test: bool,
  pub rendering_cost_function_test: bool,
}

impl Default for RenderConfig {
  fn default() -> Self {
    let costs = CostModel::default();
    Self {
      leaf_size: 4,
      texture_size: 32,
      ratio_of_visibility_threshold: 0.5,
      slice_factor: 1.0,
      maximum_priority_queue_size: 64,
      cost_structure: costs.cost_structure,
      rendering_cost: costs.rendering_cost,
      ratio_of_visibility_test: true,
      maximum_priority_queue_test: false,
      rendering_cost_function_test: false,
    }
  }
}

impl RenderConfig {
  /// Reject values the octree and tiling cannot work with.
  pub fn validate(&self) -> Result<()> {
    if self.texture_size == 0 || !self.texture_size.is_power_of_two() {
      return Err(Error::InvalidConfig(format!(
        "texture_size must be a non-zero power of two, got {}",
        self.texture_size
      )));
    }
    if self.leaf_size == 0 {
      return Err(Error::InvalidConfig("leaf_size must be at least 1".into()));
    }
    if !(self.slice_factor.is_finite() && self.slice_factor > 0.0) {
      return Err(Error::InvalidConfig(format!(
        "slice_factor must be positive and finite, got {}",
        self.slice_factor
      )));
    }
    if !(0.0..=1.0).contains(&self.ratio_of_visibility_threshold) {
      return Err(Error::InvalidConfig(format!(
        "ratio_of_visibility_threshold must lie in [0, 1], got {}",
        self.ratio_of_visibility_threshold
      )));
    }
    Ok(())
  }

  /// Active policy from the three test flags.
  ///
  /// When several flags are set the first wins, in the order ratio test,
  /// priority-queue test, cost-function test.
  pub fn selection_policy(&self) -> Result<SelectionPolicy> {
    if self.ratio_of_visibility_test {
      Ok(SelectionPolicy::RatioThreshold(self.ratio_of_visibility_threshold))
    } else if self.maximum_priority_queue_test {
      Ok(SelectionPolicy::BoundedQueue(self.maximum_priority_queue_size))
    } else if self.rendering_cost_function_test {
      Ok(SelectionPolicy::CostFunction)
    } else {
      Err(Error::NoSelectionPolicy)
    }
  }

  /// Set the flags so that `policy` is the only active one, copying its
  /// parameter into the matching field.
  pub fn set_selection_policy(&mut self, policy: SelectionPolicy) {
    self.ratio_of_visibility_test = false;
    self.maximum_priority_queue_test = false;
    self.rendering_cost_function_test = false;
    match policy {
      SelectionPolicy::RatioThreshold(threshold) => {
        self.ratio_of_visibility_test = true;
        self.ratio_of_visibility_threshold = threshold;
      }
      SelectionPolicy::BoundedQueue(size) => {
        self.maximum_priority_queue_test = true;
        self.maximum_priority_queue_size = size;
      }
      SelectionPolicy::CostFunction => self.rendering_cost_function_test = true,
    }
  }

  pub fn cost_model(&self) -> CostModel {
    CostModel {
      cost_structure: self.cost_structure,
      rendering_cost: self.rendering_cost,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
