//! OcNode - one cell of a brick's octree, stored in the arena.
//!
//! Geometry is fixed at construction. Only [`NodeMetrics`] and `displayed`
//! change, on transfer-function updates and policy pre-passes.

use serde::Serialize;

use crate::bounds::{BoundingBox, BoundingSphere};
use crate::region::Region;

/// Arena handle of a node. Children always have larger ids than their parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
  /// The root of every octree.
  pub const ROOT: NodeId = NodeId(0);

  #[inline(always)]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Per-node visibility and cost bookkeeping, recomputed bottom-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct NodeMetrics {
  /// Mean transfer-function opacity (leaf) or unweighted mean of the
  /// children's ratios (internal).
  pub ratio_of_visibility: f32,
  /// Zero-opacity share of the node, scaled by its share of the whole
  /// volume. Internal nodes sum their children.
  pub percentage_of_empty_volume: f32,
  pub empty: bool,
  /// Bit `which` set iff child `which` is empty. Always 0 on leaves.
  pub empty_children: u8,
  /// `min(cost_structure + cost_render, cost_to_render_children)`.
  pub cost: f32,
  /// 0 when empty, else 1.
  pub cost_render: f32,
  /// `level * cost_structure` of the cost model.
  pub cost_structure: f32,
  pub cost_to_render_children: f32,
}

/// A node of the octree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OcNode {
  /// 0 at the brick root.
  pub level: u32,
  /// Octant within the parent; `None` at the root.
  pub which: Option<u8>,
  /// Voxel index range covered by this node.
  pub region: Region,
  pub parent: Option<NodeId>,
  /// Exactly 8 children, indexed by `which`, or `None` for leaves.
  pub children: Option<[NodeId; 8]>,
  /// World-space box.
  pub volume_box: BoundingBox,
  pub volume_sphere: BoundingSphere,
  /// Normalized texture-space box inside the brick's texture.
  pub texture_box: BoundingBox,
  pub metrics: NodeMetrics,
  /// Set by the bounded-queue pre-pass.
  pub displayed: bool,
}

impl OcNode {
  pub(crate) fn new(
    level: u32,
    which: Option<u8>,
    region: Region,
    parent: Option<NodeId>,
    volume_box: BoundingBox,
    texture_box: BoundingBox,
  ) -> Self {
    Self {
      level,
      which,
      region,
      parent,
      children: None,
      volume_box,
      volume_sphere: BoundingSphere::from_box(&volume_box),
      texture_box,
      metrics: NodeMetrics::default(),
      displayed: true,
    }
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  #[inline]
  pub fn is_root(&self) -> bool {
    self.parent.is_none()
  }
}
