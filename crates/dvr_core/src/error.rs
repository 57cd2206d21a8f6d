//! Error type shared by the volume, octree and scene layers.

use thiserror::Error;

/// Errors reported by `dvr_core`.
///
/// Everything in this crate is deterministic recomputation over in-memory
/// arrays, so none of these are retryable: they describe a structural
/// problem the loader or renderer has to fix.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
  /// A volume dimension was zero (or the product overflowed `usize`), or a
  /// volume does not match the layout a scene was built from.
  #[error("invalid volume dimensions {size:?} (border {border})")]
  InvalidDimensions { size: [usize; 3], border: usize },

  /// A voxel coordinate or linear index fell outside the stored buffer.
  #[error("voxel index {index:?} out of bounds for size {size:?}")]
  IndexOutOfBounds { index: [usize; 3], size: [usize; 3] },

  /// A voxel buffer does not hold `product(size + 2 * border)` elements.
  #[error("{component} buffer holds {actual} voxels, expected {expected}")]
  BufferSizeMismatch {
    component: &'static str,
    expected: usize,
    actual: usize,
  },

  /// A multi-component volume was created without any R/G/B buffer.
  #[error("multi-component volume has no red, green or blue buffer")]
  MissingComponents,

  /// A voxel or gradient buffer could not be allocated.
  #[error("failed to allocate {bytes} bytes for volume storage")]
  AllocationFailed { bytes: usize },

  /// The transfer function kind does not match the volume kind.
  #[error("transfer function incompatible with volume: {0}")]
  IncompatibleTransferFunction(&'static str),

  /// A 2.5D transfer function was bound before `compute_gradients`.
  #[error("gradients must be computed before binding a 2.5D transfer function")]
  GradientsMissing,

  /// A configuration value is out of its valid range.
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  /// None of the three selection-policy flags is set.
  #[error("no node selection policy enabled")]
  NoSelectionPolicy,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
