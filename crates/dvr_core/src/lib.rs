//! dvr_core - Brick/octree spatial index for direct volume rendering
//!
//! This crate decides, frame by frame, which parts of a voxel volume a
//! slicing or ray-casting renderer has to draw, and in which order. It owns
//! no GPU state: it hands out node boxes, texture boxes and slice steps.
//!
//! # Features
//!
//! - **Voxel volumes**: byte, int, float or RGB storage with border padding,
//!   gradients and power-of-two resizing
//! - **Bricks**: texture-sized tiles of the volume, each with an octree
//! - **Visibility metrics**: ratio of visibility, empty-volume percentage and
//!   a rendering-cost heuristic, recomputed bottom-up on every transfer
//!   function change
//! - **Selection policies**: ratio threshold, bounded priority queue or cost
//!   function, always emitted back-to-front
//!
//! # Example
//!
//! ```ignore
//! use dvr_core::{RenderConfig, Scene, TransferFunction, VoxelVolume};
//!
//! let volume = VoxelVolume::from_bytes([64, 64, 64], voxels)?;
//! let mut scene = Scene::new(&volume, RenderConfig::default())?;
//! scene.update_transfer_function(&volume, &TransferFunction::ramp(40, 200))?;
//!
//! let frame = scene.frame(Vec3::new(0.0, 0.0, -100.0));
//! for node in &frame.drawables {
//!     // draw node.corners / node.texture_corners with step node.delta
//! }
//! ```

pub mod bounds;
pub mod brick;
pub mod config;
pub mod error;
pub mod metrics;
pub mod octree;
pub mod region;
pub mod scene;
pub mod synthetic;
pub mod transfer;
pub mod volume;

// Re-export commonly used items
pub use bounds::{BoundingBox, BoundingSphere};
pub use brick::{Axis, Brick, DrawableNode, SlicePlane};
pub use config::{CostModel, RenderConfig};
pub use error::{Error, Result};
pub use octree::{sort_back_to_front, NodeId, NodeMetrics, OcNode, Octree, SelectionPolicy};
pub use region::Region;
pub use scene::{create_bricks, tile_regions, Frame, Scene};
pub use transfer::{OpacityLookup, OpacitySampler, RgbLookup, TransferFunction};
pub use volume::{ComponentMask, GradientField, Layout, RgbChannels, VoxelData, VoxelVolume};
