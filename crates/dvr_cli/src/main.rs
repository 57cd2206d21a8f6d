//! Volume node-selection inspector.
//!
//! Loads a raw 8-bit volume (or generates a synthetic one), tiles it into
//! bricks, applies a transfer function and reports which octree nodes a
//! renderer would draw for one viewer position.
//!
//! Output:
//! - a per-level summary on stdout
//! - optionally the full frame (node boxes, texture boxes, slice steps) as JSON

mod config;
mod source;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dvr_core::{Frame, Scene, VoxelVolume};
use glam::Vec3;
use std::path::PathBuf;

use config::Config;
use source::{Dims, Synthetic};

/// Brick/octree node-selection inspector for voxel volumes.
#[derive(Parser, Debug)]
#[command(name = "dvr_inspect")]
#[command(about = "Reports the octree nodes selected for one frame of a voxel volume")]
struct Args {
	/// Path to configuration TOML file (defaults apply when omitted).
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Headerless 8-bit volume file, X slowest.
	#[arg(short, long, conflicts_with = "synthetic")]
	raw: Option<PathBuf>,

	/// Built-in volume to generate instead of loading a file.
	#[arg(short, long, value_enum)]
	synthetic: Option<Synthetic>,

	/// Volume dimensions as WxHxD.
	#[arg(long, default_value = "64x64x64")]
	size: Dims,

	/// Viewer position as three comma-separated floats.
	#[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
	viewer: Option<Vec<f32>>,

	/// Pad every dimension up to the next power of two first.
	#[arg(long)]
	resize: bool,

	/// Write the selected frame as JSON to this path.
	#[arg(long)]
	json: Option<PathBuf>,
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();

	let config = match &args.config {
		Some(path) => {
			println!("Loading config from: {}", path.display());
			Config::load(path)?
		}
		None => Config::default(),
	};

	let mut volume = load_volume(&args)?;
	if args.resize && volume.resize().context("Resizing volume")? {
		let [w, h, d] = volume.size();
		println!("Resized volume to {}x{}x{}", w, h, d);
	}
	if config.transfer.needs_gradients() {
		volume.compute_gradients().context("Computing gradients")?;
		if let Some(maximum) = volume.maximum_gradient() {
			log::info!("Maximum gradient magnitude {:.2}", maximum);
		}
	}

	let viewer = match (&args.viewer, config.viewer.position) {
		(Some(v), _) => Vec3::new(v[0], v[1], v[2]),
		(None, Some(p)) => Vec3::from_array(p),
		(None, None) => default_viewer(&volume),
	};

	let mut scene = Scene::new(&volume, config.render.clone()).context("Building scene")?;
	scene
		.update_transfer_function(&volume, &config.transfer.build())
		.context("Applying transfer function")?;
	scene.set_interactive(config.viewer.interactive);

	let frame = scene.frame(viewer);
	print_summary(&scene, &frame);

	if let Some(path) = &args.json {
		let file = std::fs::File::create(path)
			.with_context(|| format!("Failed to create output file: {}", path.display()))?;
		serde_json::to_writer_pretty(std::io::BufWriter::new(file), &frame)
			.with_context(|| format!("Failed to write frame JSON: {}", path.display()))?;
		println!("\nFrame written to: {}", path.display());
	}

	Ok(())
}

fn load_volume(args: &Args) -> Result<VoxelVolume> {
	let [w, h, d] = args.size.0;
	match (&args.raw, args.synthetic) {
		(Some(path), _) => {
			println!("Loading {}x{}x{} volume from: {}", w, h, d, path.display());
			source::load_raw(path, args.size)
		}
		(None, Some(kind)) => {
			println!("Generating {:?} volume at {}x{}x{}", kind, w, h, d);
			kind.generate(args.size)
		}
		(None, None) => bail!("Either --raw or --synthetic is required"),
	}
}

/// On the -Z side, two volume extents from the center.
fn default_viewer(volume: &VoxelVolume) -> Vec3 {
	volume.center() - Vec3::Z * volume.extent().max_element() * 2.0
}

fn print_summary(scene: &Scene, frame: &Frame) {
	let total_nodes: usize = scene.bricks().iter().map(|b| b.octree().len()).sum();
	let empty = frame.brick_empty.iter().filter(|e| **e).count();

	println!("\nPolicy: {:?}", scene.policy());
	println!(
		"Viewer: ({:.1}, {:.1}, {:.1})",
		frame.viewer.x, frame.viewer.y, frame.viewer.z
	);
	println!(
		"Bricks: {} ({} empty), {} octree nodes",
		frame.brick_empty.len(),
		empty,
		total_nodes
	);
	println!("Drawn: {} nodes", frame.drawables.len());

	let deepest = frame.drawables.iter().map(|d| d.level).max();
	if let Some(deepest) = deepest {
		for level in 0..=deepest {
			let count = frame.drawables.iter().filter(|d| d.level == level).count();
			if count > 0 {
				println!("  level {:>2}: {}", level, count);
			}
		}
	}

	if let Some(first) = frame.drawables.first() {
		println!("Slice step (first node): {:.4}", first.delta);
	}
}
