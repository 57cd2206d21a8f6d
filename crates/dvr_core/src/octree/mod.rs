//! Octree spatial index over one brick's voxel range.
//!
//! The tree is built once, eagerly, and never re-subdivided. Nodes live in a
//! flat arena addressed by [`NodeId`]; parents point down with an 8-id array
//! and children point up with a plain id.
//!
//! # Per-frame flow
//!
//! ```text
//! transfer function changes
//!   -> recompute()                 bottom-up metrics (reverse arena order)
//!   -> mark_displayed_by_queue()   only for SelectionPolicy::BoundedQueue
//! each frame
//!   -> select(policy, viewer)      node ids, back-to-front
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: `OcNode`, `NodeId`, `NodeMetrics`
//! - `build`: breadth-first arena construction
//! - `metrics`: visibility, empty-volume and rendering-cost passes
//! - [`selection`]: `SelectionPolicy` and the traversal
//! - [`ordering`]: back-to-front sort shared with bricks

mod build;
mod metrics;
pub mod node;
pub mod ordering;
pub mod selection;

pub use node::{NodeId, NodeMetrics, OcNode};
pub use ordering::sort_back_to_front;
pub use selection::SelectionPolicy;

use crate::bounds::BoundingBox;
use crate::region::Region;

/// Arena-backed octree rooted at [`NodeId::ROOT`].
#[derive(Clone, Debug)]
pub struct Octree {
  nodes: Vec<OcNode>,
  root: NodeId,
  leaf_size: usize,
}

impl Octree {
  /// Subdivide `region` (world box `volume_box`) down to the leaf criterion.
  pub fn new(region: Region, volume_box: BoundingBox, leaf_size: usize) -> Self {
    let (nodes, root) = build::build(region, volume_box, leaf_size);
    Self {
      nodes,
      root,
      leaf_size,
    }
  }

  #[inline]
  pub fn root(&self) -> NodeId {
    self.root
  }

  #[inline]
  pub fn root_node(&self) -> &OcNode {
    &self.nodes[self.root.index()]
  }

  pub fn leaf_size(&self) -> usize {
    self.leaf_size
  }

  /// Total node count, root included.
  #[inline]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Always false: a tree has at least its root.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Node by id.
  ///
  /// # Panics
  /// If `id` does not belong to this tree.
  #[inline]
  pub fn node(&self, id: NodeId) -> &OcNode {
    &self.nodes[id.index()]
  }

  #[inline]
  pub fn get(&self, id: NodeId) -> Option<&OcNode> {
    self.nodes.get(id.index())
  }

  #[inline]
  pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut OcNode {
    &mut self.nodes[id.index()]
  }

  pub fn children(&self, id: NodeId) -> Option<[NodeId; 8]> {
    self.node(id).children
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.node(id).parent
  }

  /// All nodes with their ids, parents before children.
  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &OcNode)> + '_ {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(index, node)| (NodeId(index as u32), node))
  }

  /// Ids of all leaves.
  pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
    self
      .iter()
      .filter(|(_, node)| node.is_leaf())
      .map(|(id, _)| id)
  }

  /// Deepest level present (0 for a single-node tree).
  pub fn depth(&self) -> u32 {
    // Breadth-first layout puts the deepest node last.
    self.nodes.last().map_or(0, |node| node.level)
  }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
