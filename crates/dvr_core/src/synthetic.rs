//! Deterministic synthetic volumes for testing, benchmarking and demos.
//!
//! Each generator produces a borderless byte volume whose contents are easy
//! to reason about, so octree metrics can be checked by hand.

use glam::Vec3;

use crate::error::Result;
use crate::volume::{try_alloc, VoxelVolume};

/// Fill a borderless byte volume from a function of `(i, j, k)`.
pub fn from_fn(size: [usize; 3], f: impl Fn(usize, usize, usize) -> u8) -> Result<VoxelVolume> {
  let [w, h, d] = size;
  let mut voxels = try_alloc(w.saturating_mul(h).saturating_mul(d), 0u8)?;
  let mut index = 0;
  for i in 0..w {
    for j in 0..h {
      for k in 0..d {
        voxels[index] = f(i, j, k);
        index += 1;
      }
    }
  }
  VoxelVolume::from_bytes(size, voxels)
}

/// Solid ball of `inside` on a background of `outside`.
///
/// `radius` is a fraction of half the smallest dimension.
pub fn sphere(size: [usize; 3], radius: f32, inside: u8, outside: u8) -> Result<VoxelVolume> {
  let center = Vec3::new(size[0] as f32, size[1] as f32, size[2] as f32) * 0.5;
  let r = radius * 0.5 * size.iter().copied().min().unwrap_or(0) as f32;
  from_fn(size, |i, j, k| {
    let p = Vec3::new(i as f32 + 0.5, j as f32 + 0.5, k as f32 + 0.5);
    if p.distance(center) <= r {
      inside
    } else {
      outside
    }
  })
}

/// Intensity rising linearly from 0 at `i = 0` to 255 at the last column.
pub fn ramp_x(size: [usize; 3]) -> Result<VoxelVolume> {
  let last = size[0].saturating_sub(1).max(1) as f32;
  from_fn(size, |i, _, _| ((i as f32 / last) * 255.0).round() as u8)
}

/// Columns below `split` hold `low`, the rest hold `high`.
pub fn split_x(size: [usize; 3], split: usize, low: u8, high: u8) -> Result<VoxelVolume> {
  from_fn(size, |i, _, _| if i < split { low } else { high })
}

/// Concentric shells of alternating `a` / `b`, `thickness` voxels each.
pub fn shells(size: [usize; 3], thickness: usize, a: u8, b: u8) -> Result<VoxelVolume> {
  let center = Vec3::new(size[0] as f32, size[1] as f32, size[2] as f32) * 0.5;
  let thickness = thickness.max(1) as f32;
  from_fn(size, |i, j, k| {
    let p = Vec3::new(i as f32 + 0.5, j as f32 + 0.5, k as f32 + 0.5);
    if (p.distance(center) / thickness) as usize % 2 == 0 {
      a
    } else {
      b
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_fn_layout() {
    let volume = from_fn([2, 3, 4], |i, j, k| (i * 100 + j * 10 + k) as u8).unwrap();
    assert_eq!(volume.voxel(1, 2, 3).unwrap(), 123.0);
    assert_eq!(volume.voxel(0, 1, 0).unwrap(), 10.0);
  }

  #[test]
  fn test_sphere_center_and_corner() {
    let volume = sphere([16, 16, 16], 0.5, 200, 0).unwrap();
    assert_eq!(volume.voxel(8, 8, 8).unwrap(), 200.0);
    assert_eq!(volume.voxel(0, 0, 0).unwrap(), 0.0);
  }

  #[test]
  fn test_ramp_endpoints() {
    let volume = ramp_x([6, 2, 2]).unwrap();
    assert_eq!(volume.voxel(0, 1, 1).unwrap(), 0.0);
    assert_eq!(volume.voxel(5, 0, 0).unwrap(), 255.0);
  }

  #[test]
  fn test_split_x() {
    let volume = split_x([8, 2, 2], 3, 1, 9).unwrap();
    assert_eq!(volume.voxel(2, 0, 0).unwrap(), 1.0);
    assert_eq!(volume.voxel(3, 1, 1).unwrap(), 9.0);
  }
}
