//! Configuration parsing for the inspector.

use anyhow::{Context, Result};
use dvr_core::{RenderConfig, TransferFunction};
use serde::Deserialize;
use std::path::Path;

/// Root configuration. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Brick size, leaf size and selection policy.
	pub render: RenderConfig,
	/// Opacity table applied before the first frame.
	pub transfer: TransferConfig,
	pub viewer: ViewerConfig,
}

/// Opacity table description.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferConfig {
	/// Opaque at and above `threshold`.
	Step { threshold: u8 },
	/// Linear from 0 at `low` to 1 at `high`.
	Ramp { low: u8, high: u8 },
	/// Everything invisible.
	Transparent,
	/// Opaque where the gradient bucket is below `max_bucket` and the
	/// intensity at or above `threshold`.
	Gradient { threshold: u8, max_bucket: u8 },
}

impl Default for TransferConfig {
	fn default() -> Self {
		TransferConfig::Step { threshold: 128 }
	}
}

impl TransferConfig {
	/// Whether the volume needs gradients before this table can be bound.
	pub fn needs_gradients(&self) -> bool {
		matches!(self, TransferConfig::Gradient { .. })
	}

	pub fn build(&self) -> TransferFunction {
		match *self {
			TransferConfig::Step { threshold } => TransferFunction::step(threshold),
			TransferConfig::Ramp { low, high } => TransferFunction::ramp(low, high),
			TransferConfig::Transparent => TransferFunction::transparent(),
			TransferConfig::Gradient {
				threshold,
				max_bucket,
			} => TransferFunction::gradient_from_fn(move |intensity, bucket| {
				if intensity >= threshold && bucket < max_bucket {
					1.0
				} else {
					0.0
				}
			}),
		}
	}
}

/// Camera settings for the single inspected frame.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
	/// World-space eye position. Defaults to a point outside the volume.
	pub position: Option<[f32; 3]>,
	/// Render at the coarser interactive slice step.
	pub interactive: bool,
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate configuration text.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config =
			toml::from_str(content).with_context(|| "Failed to parse config TOML")?;

		config
			.render
			.validate()
			.with_context(|| "Invalid [render] section")?;
		config
			.render
			.selection_policy()
			.with_context(|| "Invalid [render] section")?;
		if let TransferConfig::Ramp { low, high } = config.transfer {
			if low >= high {
				anyhow::bail!("Ramp transfer needs low < high, got {} and {}", low, high);
			}
		}

		Ok(config)
	}
}
