//! Voxel index ranges of bricks and octree nodes, and the subdivision rule.
//!
//! A region is `[column, column + width) x [row, row + height) x
//! [slab, slab + depth)` in volume voxel coordinates. Halving an odd extent
//! gives the extra voxel to the low octant on that axis:
//!
//! ```text
//! width 5:  low = 5/2 + 1 = 3   high = 5/2 = 2
//! width 4:  low = 2             high = 2
//! ```

use glam::Vec3;
use serde::Serialize;

use crate::bounds::{octant_high_x, octant_high_y, octant_high_z};

/// Absolute floor on node half-extent, applied on top of `leaf_size`.
pub const MIN_HALF_EXTENT: usize = 4;

/// Axis-aligned voxel index range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
  pub column: usize,
  pub row: usize,
  pub slab: usize,
  pub width: usize,
  pub height: usize,
  pub depth: usize,
}

/// Extent of the low half of `n` voxels.
#[inline(always)]
const fn low_half(n: usize) -> usize {
  n / 2 + n % 2
}

/// Offset and extent of one half of `n` voxels.
#[inline(always)]
const fn half(n: usize, high: bool) -> (usize, usize) {
  if high {
    (low_half(n), n / 2)
  } else {
    (0, low_half(n))
  }
}

impl Region {
  pub fn new(column: usize, row: usize, slab: usize, width: usize, height: usize, depth: usize) -> Self {
    Self {
      column,
      row,
      slab,
      width,
      height,
      depth,
    }
  }

  /// Region starting at the origin.
  pub fn from_size(size: [usize; 3]) -> Self {
    Self::new(0, 0, 0, size[0], size[1], size[2])
  }

  /// Minimum corner as `[column, row, slab]`.
  #[inline]
  pub fn offset(&self) -> [usize; 3] {
    [self.column, self.row, self.slab]
  }

  /// Extent as `[width, height, depth]`.
  #[inline]
  pub fn size(&self) -> [usize; 3] {
    [self.width, self.height, self.depth]
  }

  #[inline]
  pub fn voxel_count(&self) -> usize {
    self.width * self.height * self.depth
  }

  #[inline]
  pub fn max_extent(&self) -> usize {
    self.width.max(self.height).max(self.depth)
  }

  /// Check whether a voxel coordinate lies in the region.
  #[inline]
  pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
    (self.column..self.column + self.width).contains(&i)
      && (self.row..self.row + self.height).contains(&j)
      && (self.slab..self.slab + self.depth).contains(&k)
  }

  /// Check whether two regions share any voxel.
  pub fn overlaps(&self, other: &Region) -> bool {
    self.column < other.column + other.width
      && other.column < self.column + self.width
      && self.row < other.row + other.height
      && other.row < self.row + self.height
      && self.slab < other.slab + other.depth
      && other.slab < self.slab + self.depth
  }

  /// Leaf criterion: any half-extent below `leaf_size` or below
  /// [`MIN_HALF_EXTENT`].
  #[inline]
  pub fn is_leaf(&self, leaf_size: usize) -> bool {
    let floor = leaf_size.max(MIN_HALF_EXTENT);
    self.width / 2 < floor || self.height / 2 < floor || self.depth / 2 < floor
  }

  /// Sub-region of octant `which` (0..8).
  pub fn child(&self, which: u8) -> Region {
    let (dx, width) = half(self.width, octant_high_x(which));
    let (dy, height) = half(self.height, octant_high_y(which));
    let (dz, depth) = half(self.depth, octant_high_z(which));
    Region {
      column: self.column + dx,
      row: self.row + dy,
      slab: self.slab + dz,
      width,
      height,
      depth,
    }
  }

  /// All 8 sub-regions, indexed by `which`.
  pub fn children(&self) -> [Region; 8] {
    std::array::from_fn(|which| self.child(which as u8))
  }

  /// Low-half share of each axis: `(n/2 + 1) / n` for odd `n`, else 0.5.
  ///
  /// Used to split world and texture boxes consistently with [`child`].
  ///
  /// [`child`]: Region::child
  pub fn split_weights(&self) -> Vec3 {
    let weight = |n: usize| {
      if n % 2 == 1 {
        low_half(n) as f32 / n as f32
      } else {
        0.5
      }
    };
    Vec3::new(weight(self.width), weight(self.height), weight(self.depth))
  }
}

#[cfg(test)]
#[path = "region_test.rs"]
mod region_test;
