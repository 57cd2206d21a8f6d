//! Per-voxel gradient vectors and the log-gradient bucket used by 2.5D
//! transfer functions.
//!
//! Gradients are central differences of the raw intensity with unit steps:
//!
//! ```text
//! dx = v(i+1, j, k) - v(i-1, j, k)
//! dy = v(i, j+1, k) - v(i, j-1, k)
//! dz = v(i, j, k+1) - v(i, j, k-1)
//! stored = [dx, dy, dz, dx² + dy² + dz²]
//! ```
//!
//! Only the interior is filled; a one-voxel shell of the logical region
//! (and any padding border) stays zero.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{try_alloc, VoxelVolume};
use crate::error::{Error, Result};

/// Gradient vectors plus squared magnitude, addressed like the voxels.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientField {
  values: Vec<[f32; 4]>,
  minimum: f32,
  maximum: f32,
}

impl GradientField {
  /// `[dx, dy, dz, |g|²]` at a linear index.
  #[inline]
  pub fn at(&self, index: usize) -> [f32; 4] {
    self.values[index]
  }

  /// Smallest squared magnitude over the interior.
  pub fn minimum(&self) -> f32 {
    self.minimum
  }

  /// Largest squared magnitude over the interior.
  pub fn maximum(&self) -> f32 {
    self.maximum
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl VoxelVolume {
  /// Compute gradients over the interior of the volume.
  ///
  /// O(voxel count). Must run before binding a 2.5D transfer function.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "volume::compute_gradients"))]
  pub fn compute_gradients(&mut self) -> Result<()> {
    let layout = self.layout;
    let mut values = try_alloc(layout.len(), [0.0f32; 4])?;
    let slab_len = layout.increments()[0];

    let fold = |acc: (f32, f32), mm: (f32, f32)| (acc.0.min(mm.0), acc.1.max(mm.1));
    let identity = (f32::INFINITY, f32::NEG_INFINITY);

    #[cfg(feature = "parallel")]
    let (minimum, maximum) = values
      .par_chunks_mut(slab_len)
      .enumerate()
      .map(|(slab, out)| self.gradient_slab(slab, out))
      .reduce(|| identity, fold);

    #[cfg(not(feature = "parallel"))]
    let (minimum, maximum) = values
      .chunks_mut(slab_len)
      .enumerate()
      .map(|(slab, out)| self.gradient_slab(slab, out))
      .fold(identity, fold);

    let (minimum, maximum) = if minimum > maximum {
      tracing::warn!(size = ?layout.size(), "volume too thin for interior gradients");
      (0.0, 0.0)
    } else {
      (minimum, maximum)
    };

    tracing::debug!(minimum, maximum, "computed gradients");
    self.gradients = Some(GradientField {
      values,
      minimum,
      maximum,
    });
    Ok(())
  }

  /// Fill one padded X slab of the gradient buffer. Returns the min/max
  /// squared magnitude written, or the fold identity if the slab has no
  /// interior voxels.
  fn gradient_slab(&self, slab: usize, out: &mut [[f32; 4]]) -> (f32, f32) {
    let layout = &self.layout;
    let [w, h, d] = layout.size();
    let b = layout.border();
    let inc = layout.increments();
    let mut range = (f32::INFINITY, f32::NEG_INFINITY);

    if slab < b || w < 3 || h < 3 || d < 3 {
      return range;
    }
    let i = slab - b;
    if i == 0 || i >= w - 1 {
      return range;
    }

    let slab_start = slab * inc[0];
    for j in 1..h - 1 {
      for k in 1..d - 1 {
        let idx = layout.linear(i, j, k);
        let dx = self.raw_value(idx + inc[0]) - self.raw_value(idx - inc[0]);
        let dy = self.raw_value(idx + inc[1]) - self.raw_value(idx - inc[1]);
        let dz = self.raw_value(idx + 1) - self.raw_value(idx - 1);
        let magnitude = dx * dx + dy * dy + dz * dz;
        out[idx - slab_start] = [dx, dy, dz, magnitude];
        range.0 = range.0.min(magnitude);
        range.1 = range.1.max(magnitude);
      }
    }
    range
  }

  /// Computed gradients, if any.
  pub fn gradients(&self) -> Option<&GradientField> {
    self.gradients.as_ref()
  }

  pub fn has_gradients(&self) -> bool {
    self.gradients.is_some()
  }

  /// `[dx, dy, dz, |g|²]` at `(i, j, k)`.
  pub fn gradient(&self, i: usize, j: usize, k: usize) -> Result<[f32; 4]> {
    let index = self.layout.checked_linear(i, j, k)?;
    let field = self.gradients.as_ref().ok_or(Error::GradientsMissing)?;
    Ok(field.at(index))
  }

  pub fn minimum_gradient(&self) -> Option<f32> {
    self.gradients.as_ref().map(|g| g.minimum)
  }

  pub fn maximum_gradient(&self) -> Option<f32> {
    self.gradients.as_ref().map(|g| g.maximum)
  }

  /// Quantized log-gradient row of the 2.5D lookup table.
  ///
  /// `255 - round(255 * log2(|g|²) / log2(max |g|²))`, clamped to 0..=255.
  /// A volume whose largest squared magnitude is at most 1 has no usable log
  /// range and maps everything to bucket 0, as does a volume without
  /// gradients.
  #[inline]
  pub fn gradient_bucket(&self, index: usize) -> u8 {
    let Some(field) = self.gradients.as_ref() else {
      return 0;
    };
    gradient_bucket(field.values[index][3], field.maximum)
  }
}

/// Bucket for squared magnitude `magnitude` against volume maximum `maximum`.
#[inline]
pub(crate) fn gradient_bucket(magnitude: f32, maximum: f32) -> u8 {
  if !(maximum > 1.0) {
    return 0;
  }
  if !(magnitude > 0.0) {
    return 255;
  }
  let ratio = magnitude.log2() / maximum.log2();
  (255.0 - (255.0 * ratio).round()).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "gradient_test.rs"]
mod gradient_test;
