//! Dense voxel volume - storage, addressing and derived gradients.
//!
//! # Memory Layout
//!
//! ```text
//! Volume memory layout (row-major, Z innermost):
//!
//!   linear = (i + b) * increments[0] + (j + b) * increments[1] + (k + b)
//!
//!   increments[2] = 1
//!   increments[1] = depth + 2b
//!   increments[0] = (height + 2b) * (depth + 2b)
//!
//! i: column (width, X)   j: row (height, Y)   k: slab (depth, Z)
//! b: border size, padding voxels on every side of the logical region
//! ```
//!
//! Scalar volumes store exactly one buffer (bytes, ints or floats). RGB
//! volumes store up to three independent byte buffers, each laid out the
//! same way.

mod gradient;
mod resize;

use bitflags::bitflags;
use glam::Vec3;

pub use gradient::GradientField;

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};

bitflags! {
  /// Which of the R/G/B component buffers are present.
  ///
  /// The raw bits are the `typeOfComponents` value (1..=7).
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
  pub struct ComponentMask: u8 {
    const BLUE = 1;
    const GREEN = 2;
    const RED = 4;
  }
}

/// Index geometry of a padded dense 3D buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
  size: [usize; 3],
  border: usize,
  increments: [usize; 3],
  len: usize,
}

impl Layout {
  /// Create a layout, rejecting zero dimensions and overflowing products.
  pub fn new(size: [usize; 3], border: usize) -> Result<Self> {
    let invalid = Error::InvalidDimensions { size, border };
    if size.iter().any(|&s| s == 0) {
      return Err(invalid);
    }

    let mut padded = [0usize; 3];
    for axis in 0..3 {
      padded[axis] = border
        .checked_mul(2)
        .and_then(|b| b.checked_add(size[axis]))
        .ok_or_else(|| invalid.clone())?;
    }
    let plane = padded[1].checked_mul(padded[2]).ok_or_else(|| invalid.clone())?;
    let len = padded[0].checked_mul(plane).ok_or(invalid)?;

    Ok(Self {
      size,
      border,
      increments: [plane, padded[2], 1],
      len,
    })
  }

  /// Logical (unpadded) dimensions.
  #[inline]
  pub fn size(&self) -> [usize; 3] {
    self.size
  }

  #[inline]
  pub fn border(&self) -> usize {
    self.border
  }

  /// Index stride per axis.
  #[inline]
  pub fn increments(&self) -> [usize; 3] {
    self.increments
  }

  /// Total stored voxels, border included.
  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Linear index of logical voxel `(i, j, k)`. No bounds checking.
  #[inline(always)]
  pub fn linear(&self, i: usize, j: usize, k: usize) -> usize {
    let b = self.border;
    (i + b) * self.increments[0] + (j + b) * self.increments[1] + (k + b)
  }

  /// Linear index of `(i, j, k)`, or `IndexOutOfBounds`.
  #[inline]
  pub fn checked_linear(&self, i: usize, j: usize, k: usize) -> Result<usize> {
    if i >= self.size[0] || j >= self.size[1] || k >= self.size[2] {
      return Err(Error::IndexOutOfBounds {
        index: [i, j, k],
        size: self.size,
      });
    }
    Ok(self.linear(i, j, k))
  }
}

/// Optional per-channel byte buffers of a multi-component volume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RgbChannels {
  pub red: Option<Vec<u8>>,
  pub green: Option<Vec<u8>>,
  pub blue: Option<Vec<u8>>,
}

impl RgbChannels {
  /// Mask of the channels that are present.
  pub fn mask(&self) -> ComponentMask {
    let mut mask = ComponentMask::empty();
    mask.set(ComponentMask::RED, self.red.is_some());
    mask.set(ComponentMask::GREEN, self.green.is_some());
    mask.set(ComponentMask::BLUE, self.blue.is_some());
    mask
  }

  /// Buffer for a single channel flag.
  pub fn channel(&self, component: ComponentMask) -> Option<&[u8]> {
    if component == ComponentMask::RED {
      self.red.as_deref()
    } else if component == ComponentMask::GREEN {
      self.green.as_deref()
    } else if component == ComponentMask::BLUE {
      self.blue.as_deref()
    } else {
      None
    }
  }

  fn iter(&self) -> impl Iterator<Item = (&'static str, &Vec<u8>)> {
    [("red", &self.red), ("green", &self.green), ("blue", &self.blue)]
      .into_iter()
      .filter_map(|(name, buffer)| buffer.as_ref().map(|b| (name, b)))
  }
}

/// Voxel storage: one scalar buffer, or up to three byte channels.
#[derive(Clone, Debug, PartialEq)]
pub enum VoxelData {
  Bytes(Vec<u8>),
  Ints(Vec<i32>),
  Floats(Vec<f32>),
  Rgb(RgbChannels),
}

impl VoxelData {
  fn check_len(&self, expected: usize) -> Result<()> {
    let mismatch = |component, actual| Error::BufferSizeMismatch {
      component,
      expected,
      actual,
    };
    match self {
      VoxelData::Bytes(v) if v.len() != expected => Err(mismatch("scalar", v.len())),
      VoxelData::Ints(v) if v.len() != expected => Err(mismatch("scalar", v.len())),
      VoxelData::Floats(v) if v.len() != expected => Err(mismatch("scalar", v.len())),
      VoxelData::Rgb(channels) => {
        if channels.mask().is_empty() {
          return Err(Error::MissingComponents);
        }
        for (name, buffer) in channels.iter() {
          if buffer.len() != expected {
            return Err(mismatch(name, buffer.len()));
          }
        }
        Ok(())
      }
      _ => Ok(()),
    }
  }

  /// Min/max of the stored scalar values, used to map ints and floats onto
  /// the 0..=255 lookup domain.
  fn value_range(&self) -> (f32, f32) {
    let fold = |iter: &mut dyn Iterator<Item = f32>| {
      iter
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    };
    let (lo, hi) = match self {
      VoxelData::Ints(v) => fold(&mut v.iter().map(|&x| x as f32)),
      VoxelData::Floats(v) => fold(&mut v.iter().copied()),
      VoxelData::Bytes(_) | VoxelData::Rgb(_) => (0.0, 255.0),
    };
    if lo > hi {
      (0.0, 0.0)
    } else {
      (lo, hi)
    }
  }
}

/// Allocate a buffer of `len` copies of `fill`, reporting allocation failure.
pub(crate) fn try_alloc<T: Clone>(len: usize, fill: T) -> Result<Vec<T>> {
  let mut buffer = Vec::new();
  buffer
    .try_reserve_exact(len)
    .map_err(|_| Error::AllocationFailed {
      bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
  buffer.resize(len, fill);
  Ok(buffer)
}

/// Dense 3D voxel volume with physical placement and optional gradients.
#[derive(Clone, Debug)]
pub struct VoxelVolume {
  layout: Layout,
  data: VoxelData,
  value_range: (f32, f32),
  scale: Vec3,
  origin: Vec3,
  extent: Vec3,
  gradients: Option<GradientField>,
}

impl VoxelVolume {
  /// Wrap populated voxel buffers.
  ///
  /// Every buffer must hold `product(size[i] + 2 * border)` voxels. Scale
  /// defaults to one world unit per voxel, origin to zero.
  pub fn new(size: [usize; 3], border: usize, data: VoxelData) -> Result<Self> {
    let layout = Layout::new(size, border)?;
    data.check_len(layout.len())?;
    let value_range = data.value_range();
    let scale = Vec3::ONE;

    Ok(Self {
      layout,
      data,
      value_range,
      scale,
      origin: Vec3::ZERO,
      extent: extent_of(size, scale),
      gradients: None,
    })
  }

  /// Borderless single-component byte volume.
  pub fn from_bytes(size: [usize; 3], voxels: Vec<u8>) -> Result<Self> {
    Self::new(size, 0, VoxelData::Bytes(voxels))
  }

  /// Borderless byte volume with every voxel set to `value`.
  pub fn filled(size: [usize; 3], value: u8) -> Result<Self> {
    let layout = Layout::new(size, 0)?;
    Self::from_bytes(size, try_alloc(layout.len(), value)?)
  }

  /// Set per-axis voxel spacing; extent follows.
  pub fn with_scale(mut self, scale: Vec3) -> Self {
    self.scale = scale;
    self.extent = extent_of(self.layout.size, scale);
    self
  }

  /// Set the world-space minimum corner.
  pub fn with_origin(mut self, origin: Vec3) -> Self {
    self.origin = origin;
    self
  }

  #[inline]
  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  #[inline]
  pub fn size(&self) -> [usize; 3] {
    self.layout.size
  }

  #[inline]
  pub fn border_size(&self) -> usize {
    self.layout.border
  }

  #[inline]
  pub fn increments(&self) -> [usize; 3] {
    self.layout.increments
  }

  /// Stored voxel count, border included.
  #[inline]
  pub fn number_of_voxels(&self) -> usize {
    self.layout.len
  }

  pub fn data(&self) -> &VoxelData {
    &self.data
  }

  pub fn scale(&self) -> Vec3 {
    self.scale
  }

  pub fn origin(&self) -> Vec3 {
    self.origin
  }

  /// World-space size of the volume.
  pub fn extent(&self) -> Vec3 {
    self.extent
  }

  pub fn center(&self) -> Vec3 {
    self.origin + self.extent * 0.5
  }

  pub fn bounding_box(&self) -> BoundingBox {
    BoundingBox::new(self.origin, self.origin + self.extent)
  }

  /// Physical volume in world units cubed.
  pub fn physical_volume(&self) -> f32 {
    self.extent.x * self.extent.y * self.extent.z
  }

  /// Present R/G/B channels; empty for scalar volumes.
  pub fn component_mask(&self) -> ComponentMask {
    match &self.data {
      VoxelData::Rgb(channels) => channels.mask(),
      _ => ComponentMask::empty(),
    }
  }

  /// `typeOfComponents` bitmask value (0 for scalar volumes).
  pub fn type_of_components(&self) -> u8 {
    self.component_mask().bits()
  }

  /// Number of R/G/B channels present (0 for scalar volumes).
  pub fn number_of_components(&self) -> usize {
    self.component_mask().bits().count_ones() as usize
  }

  pub fn is_rgb(&self) -> bool {
    matches!(self.data, VoxelData::Rgb(_))
  }

  /// Raw intensity at `(i, j, k)`. RGB volumes report the mean of the
  /// present channels.
  pub fn voxel(&self, i: usize, j: usize, k: usize) -> Result<f32> {
    let index = self.layout.checked_linear(i, j, k)?;
    Ok(self.raw_value(index))
  }

  /// Raw intensity at a linear index (border voxels included).
  pub fn voxel_at_index(&self, index: usize) -> Result<f32> {
    self.check_index(index)?;
    Ok(self.raw_value(index))
  }

  /// Red channel at `(i, j, k)`; `None` if the volume has no red buffer.
  pub fn red_voxel(&self, i: usize, j: usize, k: usize) -> Result<Option<u8>> {
    self.channel_voxel(ComponentMask::RED, i, j, k)
  }

  pub fn green_voxel(&self, i: usize, j: usize, k: usize) -> Result<Option<u8>> {
    self.channel_voxel(ComponentMask::GREEN, i, j, k)
  }

  pub fn blue_voxel(&self, i: usize, j: usize, k: usize) -> Result<Option<u8>> {
    self.channel_voxel(ComponentMask::BLUE, i, j, k)
  }

  fn channel_voxel(
    &self,
    component: ComponentMask,
    i: usize,
    j: usize,
    k: usize,
  ) -> Result<Option<u8>> {
    let index = self.layout.checked_linear(i, j, k)?;
    Ok(self.component_at(index, component))
  }

  fn check_index(&self, index: usize) -> Result<()> {
    if index >= self.layout.len {
      return Err(Error::IndexOutOfBounds {
        index: [index, 0, 0],
        size: [self.layout.len, 1, 1],
      });
    }
    Ok(())
  }

  /// Value of one channel at a linear index.
  #[inline]
  pub(crate) fn component_at(&self, index: usize, component: ComponentMask) -> Option<u8> {
    match &self.data {
      VoxelData::Rgb(channels) => channels.channel(component).map(|c| c[index]),
      _ => None,
    }
  }

  /// Raw stored value as float.
  #[inline]
  pub(crate) fn raw_value(&self, index: usize) -> f32 {
    match &self.data {
      VoxelData::Bytes(v) => v[index] as f32,
      VoxelData::Ints(v) => v[index] as f32,
      VoxelData::Floats(v) => v[index],
      VoxelData::Rgb(channels) => {
        let (sum, count) = channels
          .iter()
          .fold((0u32, 0u32), |(s, n), (_, c)| (s + c[index] as u32, n + 1));
        sum as f32 / count.max(1) as f32
      }
    }
  }

  /// Value mapped onto the 0..=255 transfer-function domain.
  #[inline]
  pub(crate) fn intensity_index(&self, index: usize) -> u8 {
    match &self.data {
      VoxelData::Bytes(v) => v[index],
      VoxelData::Rgb(_) => self.raw_value(index).round() as u8,
      VoxelData::Ints(_) | VoxelData::Floats(_) => {
        let (lo, hi) = self.value_range;
        if hi <= lo {
          return 0;
        }
        let t = (self.raw_value(index) - lo) / (hi - lo);
        (t * 255.0).round().clamp(0.0, 255.0) as u8
      }
    }
  }
}

fn extent_of(size: [usize; 3], scale: Vec3) -> Vec3 {
  Vec3::new(size[0] as f32, size[1] as f32, size[2] as f32) * scale
}
