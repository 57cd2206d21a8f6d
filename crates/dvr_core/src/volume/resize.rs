//! Power-of-two resizing for renderers without NPOT texture support.

use glam::Vec3;

use super::{try_alloc, Layout, RgbChannels, VoxelData, VoxelVolume};
use crate::error::Result;

impl VoxelVolume {
  /// Pad every axis up to the next power of two, filling new voxels with 0.
  ///
  /// Returns `false` (and leaves the volume untouched) when all dimensions
  /// already are powers of two.
  pub fn resize(&mut self) -> Result<bool> {
    self.resize_with_fill(0)
  }

  /// Pad every axis up to the next power of two, centering the original
  /// data (`start = (new - old) / 2`) and filling new voxels with `fill`.
  ///
  /// The origin moves by `-start * scale` so the original voxels keep their
  /// world placement. Border voxels move with the data. Int and float
  /// volumes refresh their normalization range, since `fill` may extend it.
  ///
  /// Gradients, if present, are recomputed. If that recompute fails the
  /// volume keeps its resized data and reports no gradients.
  pub fn resize_with_fill(&mut self, fill: u8) -> Result<bool> {
    let old = self.layout;
    let old_size = old.size();
    if old_size.iter().all(|s| s.is_power_of_two()) {
      return Ok(false);
    }

    let new_size = old_size.map(usize::next_power_of_two);
    let new = Layout::new(new_size, old.border())?;
    let start = [
      (new_size[0] - old_size[0]) / 2,
      (new_size[1] - old_size[1]) / 2,
      (new_size[2] - old_size[2]) / 2,
    ];

    let data = match &self.data {
      VoxelData::Bytes(v) => VoxelData::Bytes(repack(v, &old, &new, start, fill)?),
      VoxelData::Ints(v) => VoxelData::Ints(repack(v, &old, &new, start, fill as i32)?),
      VoxelData::Floats(v) => VoxelData::Floats(repack(v, &old, &new, start, fill as f32)?),
      VoxelData::Rgb(channels) => {
        let channel = |c: &Option<Vec<u8>>| -> Result<Option<Vec<u8>>> {
          c.as_ref()
            .map(|buffer| repack(buffer, &old, &new, start, fill))
            .transpose()
        };
        VoxelData::Rgb(RgbChannels {
          red: channel(&channels.red)?,
          green: channel(&channels.green)?,
          blue: channel(&channels.blue)?,
        })
      }
    };

    let shift = Vec3::new(start[0] as f32, start[1] as f32, start[2] as f32) * self.scale;
    self.value_range = data.value_range();
    self.data = data;
    self.layout = new;
    self.origin -= shift;
    self.extent = super::extent_of(new_size, self.scale);

    tracing::info!(from = ?old_size, to = ?new_size, "resized volume to power-of-two dimensions");

    if self.gradients.take().is_some() {
      self.compute_gradients()?;
    }
    Ok(true)
  }
}

/// Copy `src` (laid out by `old`) into a fresh buffer laid out by `new`,
/// offset by `start` voxels on each axis. Both layouts share one border
/// width, so whole padded rows are copied and the border travels along.
fn repack<T: Copy>(src: &[T], old: &Layout, new: &Layout, start: [usize; 3], fill: T) -> Result<Vec<T>> {
  let mut dst = try_alloc(new.len(), fill)?;
  let b2 = 2 * old.border();
  let [w, h, d] = old.size().map(|s| s + b2);
  let from_inc = old.increments();
  let to_inc = new.increments();
  for i in 0..w {
    for j in 0..h {
      let from = i * from_inc[0] + j * from_inc[1];
      let to = (i + start[0]) * to_inc[0] + (j + start[1]) * to_inc[1] + start[2];
      dst[to..to + d].copy_from_slice(&src[from..from + d]);
    }
  }
  Ok(dst)
}

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;
