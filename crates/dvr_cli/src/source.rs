//! Volume sources: raw byte files or built-in synthetic volumes.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use dvr_core::{synthetic, VoxelVolume};
use std::path::Path;
use std::str::FromStr;

/// Volume dimensions written as `WxHxD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims(pub [usize; 3]);

impl FromStr for Dims {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		let parts: Vec<&str> = s.split(|c: char| c == 'x' || c == 'X').collect();
		if parts.len() != 3 {
			bail!("Expected dimensions as WxHxD, got '{}'", s);
		}
		let mut size = [0usize; 3];
		for (axis, part) in parts.iter().enumerate() {
			size[axis] = part
				.trim()
				.parse()
				.with_context(|| format!("Invalid dimension '{}' in '{}'", part, s))?;
			if size[axis] == 0 {
				bail!("Dimensions must be non-zero, got '{}'", s);
			}
		}
		Ok(Dims(size))
	}
}

/// Built-in test volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Synthetic {
	/// Solid ball on an empty background.
	Sphere,
	/// Concentric opaque and empty shells.
	Shells,
	/// Intensity rising along X.
	Ramp,
}

impl Synthetic {
	pub fn generate(self, size: Dims) -> Result<VoxelVolume> {
		let volume = match self {
			Synthetic::Sphere => synthetic::sphere(size.0, 0.8, 220, 0),
			Synthetic::Shells => synthetic::shells(size.0, 4, 240, 0),
			Synthetic::Ramp => synthetic::ramp_x(size.0),
		};
		volume.with_context(|| format!("Failed to generate {:?} volume", self))
	}
}

/// Load a headerless 8-bit volume, X slowest and Z fastest.
pub fn load_raw(path: &Path, size: Dims) -> Result<VoxelVolume> {
	let bytes = std::fs::read(path)
		.with_context(|| format!("Failed to read volume file: {}", path.display()))?;
	let [w, h, d] = size.0;
	let Some(expected) = w.checked_mul(h).and_then(|wh| wh.checked_mul(d)) else {
		bail!("{}x{}x{} overflows the addressable voxel count", w, h, d);
	};
	if bytes.len() != expected {
		bail!(
			"{} holds {} bytes, but {}x{}x{} needs {}",
			path.display(),
			bytes.len(),
			w,
			h,
			d,
			expected
		);
	}
	VoxelVolume::from_bytes(size.0, bytes)
		.with_context(|| format!("Failed to build volume from {}", path.display()))
}
