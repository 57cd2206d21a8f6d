//! Axis-aligned boxes and bounding spheres for bricks and octree nodes.
//!
//! # Octant Convention
//!
//! Children are keyed by `which` in 0..8. The low bit picks the X half, the
//! middle bit the Z half and the high bit the Y half:
//!
//! ```text
//! which  X   Y   Z
//!   0    lo  lo  lo
//!   1    hi  lo  lo
//!   2    lo  lo  hi
//!   3    hi  lo  hi
//!   4    lo  hi  lo
//!   5    hi  hi  lo
//!   6    lo  hi  hi
//!   7    hi  hi  hi
//! ```
//!
//! The same table drives index-range subdivision (see [`crate::region`]), so
//! world boxes, texture boxes and voxel ranges always agree.

use glam::Vec3;
use serde::Serialize;

/// True if octant `which` takes the high half along X.
#[inline(always)]
pub const fn octant_high_x(which: u8) -> bool {
	which & 1 != 0
}

/// True if octant `which` takes the high half along Y.
#[inline(always)]
pub const fn octant_high_y(which: u8) -> bool {
	which >= 4
}

/// True if octant `which` takes the high half along Z.
#[inline(always)]
pub const fn octant_high_z(which: u8) -> bool {
	(which >> 1) & 1 != 0
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
	/// Minimum corner (inclusive).
	pub min: Vec3,
	/// Maximum corner (inclusive).
	pub max: Vec3,
}

impl BoundingBox {
	/// The normalized texture-space box [0, 1]³.
	pub const UNIT: Self = Self {
		min: Vec3::ZERO,
		max: Vec3::ONE,
	};

	/// Create a new box from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: Vec3, max: Vec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"box min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Check if this box contains a point (boundary included).
	#[inline]
	pub fn contains_point(&self, point: Vec3) -> bool {
		point.x >= self.min.x
			&& point.x <= self.max.x
			&& point.y >= self.min.y
			&& point.y <= self.max.y
			&& point.z >= self.min.z
			&& point.z <= self.max.z
	}

	/// Get the size of the box (max - min).
	#[inline]
	pub fn size(&self) -> Vec3 {
		self.max - self.min
	}

	/// Get the center of the box.
	#[inline]
	pub fn center(&self) -> Vec3 {
		(self.min + self.max) * 0.5
	}

	/// Length of the main diagonal.
	#[inline]
	pub fn diagonal(&self) -> f32 {
		self.size().length()
	}

	/// Enclosed volume.
	#[inline]
	pub fn volume(&self) -> f32 {
		let s = self.size();
		s.x * s.y * s.z
	}

	/// Minimum distance from `point` to the box; 0 when inside.
	#[inline]
	pub fn distance_to_point(&self, point: Vec3) -> f32 {
		point.distance(point.clamp(self.min, self.max))
	}

	/// The 8 corners, indexed with bit 0 = X, bit 1 = Y, bit 2 = Z.
	pub fn corners(&self) -> [Vec3; 8] {
		std::array::from_fn(|c| {
			Vec3::new(
				if c & 1 != 0 { self.max.x } else { self.min.x },
				if c & 2 != 0 { self.max.y } else { self.min.y },
				if c & 4 != 0 { self.max.z } else { self.min.z },
			)
		})
	}

	/// Point splitting the box at fractions `weights` of its size, measured
	/// from `min`.
	#[inline]
	pub fn weighted_point(&self, weights: Vec3) -> Vec3 {
		self.min + self.size() * weights
	}

	/// Sub-box of octant `which`, split at `weighted_point(weights)`.
	///
	/// `weights` is the low half's share along each axis, so children of a
	/// node with an odd voxel count get boxes proportional to their ranges.
	pub fn split(&self, which: u8, weights: Vec3) -> Self {
		let mid = self.weighted_point(weights);
		let (min_x, max_x) = if octant_high_x(which) {
			(mid.x, self.max.x)
		} else {
			(self.min.x, mid.x)
		};
		let (min_y, max_y) = if octant_high_y(which) {
			(mid.y, self.max.y)
		} else {
			(self.min.y, mid.y)
		};
		let (min_z, max_z) = if octant_high_z(which) {
			(mid.z, self.max.z)
		} else {
			(self.min.z, mid.z)
		};
		Self::new(
			Vec3::new(min_x, min_y, min_z),
			Vec3::new(max_x, max_y, max_z),
		)
	}
}

/// Sphere enclosing a box: centered on it, radius half the diagonal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingSphere {
	pub center: Vec3,
	pub radius: f32,
}

impl BoundingSphere {
	pub fn new(center: Vec3, radius: f32) -> Self {
		Self { center, radius }
	}

	pub fn from_box(aabb: &BoundingBox) -> Self {
		Self {
			center: aabb.center(),
			radius: aabb.diagonal() * 0.5,
		}
	}

	/// Distance from `point` to the sphere surface; negative when inside.
	#[inline]
	pub fn signed_distance(&self, point: Vec3) -> f32 {
		point.distance(self.center) - self.radius
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_contains_point() {
		let aabb = BoundingBox::new(Vec3::ZERO, Vec3::splat(10.0));

		// Inside
		assert!(aabb.contains_point(Vec3::splat(5.0)));

		// On boundary
		assert!(aabb.contains_point(Vec3::ZERO));
		assert!(aabb.contains_point(Vec3::splat(10.0)));

		// Outside
		assert!(!aabb.contains_point(Vec3::splat(-1.0)));
		assert!(!aabb.contains_point(Vec3::splat(11.0)));
	}

	#[test]
	fn test_size_center_volume() {
		let aabb = BoundingBox::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
		assert_eq!(aabb.size(), Vec3::new(2.0, 4.0, 6.0));
		assert_eq!(aabb.center(), Vec3::ZERO);
		assert_eq!(aabb.volume(), 48.0);
	}

	#[test]
	fn test_distance_to_point() {
		let aabb = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
		assert_eq!(aabb.distance_to_point(Vec3::splat(0.5)), 0.0);
		assert_eq!(aabb.distance_to_point(Vec3::new(3.0, 0.5, 0.5)), 2.0);
		assert_eq!(aabb.distance_to_point(Vec3::new(4.0, 5.0, 0.0)), 5.0);
	}

	#[test]
	fn test_corners_bit_order() {
		let aabb = BoundingBox::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
		let corners = aabb.corners();
		assert_eq!(corners[0], Vec3::ZERO);
		assert_eq!(corners[1], Vec3::new(1.0, 0.0, 0.0));
		assert_eq!(corners[2], Vec3::new(0.0, 2.0, 0.0));
		assert_eq!(corners[4], Vec3::new(0.0, 0.0, 3.0));
		assert_eq!(corners[7], Vec3::new(1.0, 2.0, 3.0));
	}

	/// Octant table: 2 is (lo, lo, hi) and 4 is (lo, hi, lo).
	#[test]
	fn test_split_follows_octant_table() {
		let aabb = BoundingBox::new(Vec3::ZERO, Vec3::splat(2.0));
		let half = Vec3::splat(0.5);

		assert_eq!(aabb.split(0, half), BoundingBox::new(Vec3::ZERO, Vec3::ONE));
		assert_eq!(
			aabb.split(2, half),
			BoundingBox::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 2.0))
		);
		assert_eq!(
			aabb.split(4, half),
			BoundingBox::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 2.0, 1.0))
		);
		assert_eq!(aabb.split(7, half), BoundingBox::new(Vec3::ONE, Vec3::splat(2.0)));
	}

	#[test]
	fn test_weighted_split() {
		let aabb = BoundingBox::new(Vec3::ZERO, Vec3::new(8.0, 4.0, 4.0));
		// Low half takes 5/8 along X.
		let weights = Vec3::new(0.625, 0.5, 0.5);
		assert_eq!(aabb.split(0, weights).max.x, 5.0);
		assert_eq!(aabb.split(1, weights).min.x, 5.0);
		assert_eq!(aabb.split(1, weights).max.x, 8.0);
	}

	#[test]
	fn test_sphere_from_box() {
		let aabb = BoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 1.0));
		let sphere = BoundingSphere::from_box(&aabb);
		assert_eq!(sphere.center, Vec3::new(1.0, 1.0, 0.5));
		assert_eq!(sphere.radius, 1.5);
		assert_eq!(sphere.signed_distance(Vec3::new(1.0, 1.0, 3.0)), 1.0);
	}
}
