//! Transfer-function lookup tables and the opacity samplers built from them.
//!
//! The octree only ever asks "how opaque is the voxel at linear index N?".
//! [`OpacitySampler`] answers that once per volume kind so the metric
//! passes are written a single time:
//!
//! - scalar volume + 256-entry table: `alpha[v]`
//! - RGB volume + per-channel tables: mean of `table_c[v_c]` over present
//!   channels
//! - any volume with gradients + 256x256 table:
//!   `alpha2d[gradient_bucket * 256 + v]`

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::volume::{ComponentMask, VoxelVolume};

/// Entries in a 1D lookup table.
pub const LOOKUP_SIZE: usize = 256;

/// Entries in a 2.5D (intensity x log-gradient) lookup table.
pub const LOOKUP_SIZE_2D: usize = LOOKUP_SIZE * LOOKUP_SIZE;

/// Per-voxel opacity in transfer-function space.
pub trait OpacitySampler {
  /// Opacity of the voxel at a volume linear index. 0 means fully
  /// transparent; the metric passes treat exactly 0 as empty.
  fn opacity(&self, index: usize) -> f32;
}

impl<F: Fn(usize) -> f32> OpacitySampler for F {
  #[inline]
  fn opacity(&self, index: usize) -> f32 {
    self(index)
  }
}

/// A 256-entry opacity table.
pub type Lookup = Box<[f32; LOOKUP_SIZE]>;

/// Independent per-channel tables for RGB volumes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RgbLookup {
  pub red: Option<Lookup>,
  pub green: Option<Lookup>,
  pub blue: Option<Lookup>,
}

/// Opacity lookup handed over by the transfer-function editor.
#[derive(Clone, Debug, PartialEq)]
pub enum TransferFunction {
  /// `alpha[intensity]`.
  Scalar(Lookup),
  /// One table per color channel.
  Rgb(RgbLookup),
  /// `alpha2d[bucket * 256 + intensity]`, exactly [`LOOKUP_SIZE_2D`] entries.
  Gradient(Box<[f32]>),
}

/// Build a 256-entry table from a function of the intensity.
pub fn lookup_from_fn(f: impl Fn(u8) -> f32) -> Lookup {
  Box::new(std::array::from_fn(|i| f(i as u8)))
}

impl TransferFunction {
  /// Scalar table from a function of the intensity.
  pub fn from_fn(f: impl Fn(u8) -> f32) -> Self {
    TransferFunction::Scalar(lookup_from_fn(f))
  }

  /// 0 below `low`, 1 from `high` up, linear in between.
  pub fn ramp(low: u8, high: u8) -> Self {
    Self::from_fn(|v| {
      if v < low {
        0.0
      } else if v >= high {
        1.0
      } else {
        (v - low) as f32 / (high - low) as f32
      }
    })
  }

  /// 1 from `threshold` up, 0 below.
  pub fn step(threshold: u8) -> Self {
    Self::from_fn(|v| if v >= threshold { 1.0 } else { 0.0 })
  }

  /// Fully transparent scalar table.
  pub fn transparent() -> Self {
    Self::from_fn(|_| 0.0)
  }

  /// 2.5D table from a function of `(intensity, gradient_bucket)`.
  pub fn gradient_from_fn(f: impl Fn(u8, u8) -> f32) -> Self {
    let table: Vec<f32> = (0..LOOKUP_SIZE_2D)
      .map(|i| f((i % LOOKUP_SIZE) as u8, (i / LOOKUP_SIZE) as u8))
      .collect();
    TransferFunction::Gradient(table.into_boxed_slice())
  }

  /// 2.5D table from a raw buffer, checking its length.
  pub fn gradient(table: Vec<f32>) -> Result<Self> {
    if table.len() != LOOKUP_SIZE_2D {
      return Err(Error::IncompatibleTransferFunction(
        "2.5D lookup table must hold 256x256 entries",
      ));
    }
    Ok(TransferFunction::Gradient(table.into_boxed_slice()))
  }

  /// Bind this table to a volume, validating that they fit together.
  pub fn bind<'a>(&'a self, volume: &'a VoxelVolume) -> Result<OpacityLookup<'a>> {
    match self {
      TransferFunction::Scalar(alpha) => Ok(OpacityLookup::Scalar { volume, alpha }),
      TransferFunction::Rgb(tables) => {
        if !volume.is_rgb() {
          return Err(Error::IncompatibleTransferFunction(
            "per-channel tables need an RGB volume",
          ));
        }
        let mut channels = SmallVec::new();
        for (component, table) in [
          (ComponentMask::RED, &tables.red),
          (ComponentMask::GREEN, &tables.green),
          (ComponentMask::BLUE, &tables.blue),
        ] {
          if !volume.component_mask().contains(component) {
            continue;
          }
          let table = table.as_deref().ok_or(Error::IncompatibleTransferFunction(
            "missing lookup table for a present color channel",
          ))?;
          channels.push((component, table));
        }
        Ok(OpacityLookup::Rgb { volume, channels })
      }
      TransferFunction::Gradient(table) => {
        if table.len() != LOOKUP_SIZE_2D {
          return Err(Error::IncompatibleTransferFunction(
            "2.5D lookup table must hold 256x256 entries",
          ));
        }
        if !volume.has_gradients() {
          return Err(Error::GradientsMissing);
        }
        if volume.maximum_gradient().map_or(true, |m| m <= 1.0) {
          tracing::warn!("flat volume: every voxel maps to gradient bucket 0");
        }
        Ok(OpacityLookup::Gradient { volume, table })
      }
    }
  }
}

/// A transfer function bound to a volume.
#[derive(Clone, Debug)]
pub enum OpacityLookup<'a> {
  Scalar {
    volume: &'a VoxelVolume,
    alpha: &'a [f32; LOOKUP_SIZE],
  },
  Rgb {
    volume: &'a VoxelVolume,
    channels: SmallVec<[(ComponentMask, &'a [f32; LOOKUP_SIZE]); 3]>,
  },
  Gradient {
    volume: &'a VoxelVolume,
    table: &'a [f32],
  },
}

impl OpacitySampler for OpacityLookup<'_> {
  #[inline]
  fn opacity(&self, index: usize) -> f32 {
    match self {
      OpacityLookup::Scalar { volume, alpha } => alpha[volume.intensity_index(index) as usize],
      OpacityLookup::Rgb { volume, channels } => {
        let sum: f32 = channels
          .iter()
          .filter_map(|(component, table)| {
            volume
              .component_at(index, *component)
              .map(|v| table[v as usize])
          })
          .sum();
        sum / channels.len().max(1) as f32
      }
      OpacityLookup::Gradient { volume, table } => {
        let bucket = volume.gradient_bucket(index) as usize;
        table[bucket * LOOKUP_SIZE + volume.intensity_index(index) as usize]
      }
    }
  }
}

#[cfg(test)]
#[path = "transfer_test.rs"]
mod transfer_test;
