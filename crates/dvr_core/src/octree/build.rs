//! Eager top-down octree construction into a flat arena.
//!
//! Nodes are appended breadth-first: the 8 children of a node occupy a
//! contiguous id range that starts after every node already queued. So a
//! parent always precedes its children, and walking ids in reverse is a
//! valid post-order for bottom-up passes.

use super::node::{NodeId, OcNode};
use crate::bounds::BoundingBox;
use crate::region::Region;

const MAX_PREALLOCATED_NODES: usize = 1 << 20;

/// Node count of a full octree as deep as the path through octant 0 (the
/// largest child), used to size the arena up front.
fn capacity_hint(region: &Region, leaf_size: usize) -> usize {
  let mut hint = 1usize;
  let mut level_width = 1usize;
  let mut current = *region;
  while !current.is_leaf(leaf_size) && hint < MAX_PREALLOCATED_NODES {
    current = current.child(0);
    level_width = level_width.saturating_mul(8);
    hint = hint.saturating_add(level_width);
  }
  hint.min(MAX_PREALLOCATED_NODES)
}

/// Build the octree over `region`, whose world box is `volume_box` and whose
/// texture box is the unit cube.
///
/// Returns the arena and the root id ([`NodeId::ROOT`]).
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "octree::build"))]
pub(crate) fn build(region: Region, volume_box: BoundingBox, leaf_size: usize) -> (Vec<OcNode>, NodeId) {
  let mut nodes = Vec::with_capacity(capacity_hint(&region, leaf_size));
  nodes.push(OcNode::new(0, None, region, None, volume_box, BoundingBox::UNIT));

  let mut cursor = 0;
  while cursor < nodes.len() {
    let id = cursor;
    cursor += 1;

    let parent = &nodes[id];
    if parent.region.is_leaf(leaf_size) {
      continue;
    }

    let weights = parent.region.split_weights();
    let level = parent.level + 1;
    let children: [OcNode; 8] = std::array::from_fn(|which| {
      let which = which as u8;
      OcNode::new(
        level,
        Some(which),
        parent.region.child(which),
        Some(NodeId(id as u32)),
        parent.volume_box.split(which, weights),
        parent.texture_box.split(which, weights),
      )
    });

    let first = nodes.len() as u32;
    nodes[id].children = Some(std::array::from_fn(|which| NodeId(first + which as u32)));
    nodes.extend(children);
  }

  (nodes, NodeId::ROOT)
}
