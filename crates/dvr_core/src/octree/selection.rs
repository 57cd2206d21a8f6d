//! Frame-time node selection.
//!
//! Exactly one [`SelectionPolicy`] is active per scene. Every policy shares
//! one guard: a node whose ratio of visibility is exactly 0 is neither drawn
//! nor descended into.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::node::{NodeId, OcNode};
use super::ordering::sort_back_to_front;
use super::Octree;

/// How the traversal decides between drawing a node and descending.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectionPolicy {
  /// Draw a node once its ratio of visibility reaches the threshold.
  RatioThreshold(f32),
  /// Best-first expansion by empty-volume percentage until the queue holds
  /// this many nodes; see [`Octree::mark_displayed_by_queue`].
  BoundedQueue(usize),
  /// Draw a node when drawing it is cheaper than drawing its children.
  CostFunction,
}

impl SelectionPolicy {
  /// Whether an internal node that passed the shared guard is drawn as is.
  #[inline]
  fn selects(&self, node: &OcNode) -> bool {
    match *self {
      SelectionPolicy::RatioThreshold(threshold) => node.metrics.ratio_of_visibility >= threshold,
      SelectionPolicy::BoundedQueue(_) => node.displayed,
      SelectionPolicy::CostFunction => node.metrics.cost < node.metrics.cost_to_render_children,
    }
  }
}

/// Max-heap entry: larger empty-volume percentage pops first, lower id on
/// ties.
#[derive(Clone, Copy, Debug)]
struct QueueEntry {
  key: f32,
  id: NodeId,
}

impl QueueEntry {
  fn new(id: NodeId, node: &OcNode) -> Self {
    Self {
      key: node.metrics.percentage_of_empty_volume,
      id,
    }
  }
}

impl PartialEq for QueueEntry {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for QueueEntry {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .key
      .total_cmp(&other.key)
      .then_with(|| other.id.cmp(&self.id))
  }
}

impl Octree {
  /// Children of `id` ordered farthest-first from `viewer`, or `None` for a
  /// leaf.
  pub fn sorted_children(&self, id: NodeId, viewer: Vec3) -> Option<[NodeId; 8]> {
    let mut children = self.children(id)?;
    sort_back_to_front(&mut children, viewer, |child| self.node(*child).volume_box);
    Some(children)
  }

  /// Bounded best-first pre-pass for [`SelectionPolicy::BoundedQueue`].
  ///
  /// Marks every node displayed, then repeatedly pops the queued node with
  /// the largest empty-volume percentage. A popped internal node is marked
  /// not displayed and its non-empty children are queued; a popped leaf
  /// stays displayed. Expansion stops once the queue is empty or holds
  /// `max_queue_size` nodes.
  ///
  /// Returns false (and marks the root not displayed) when the root has no
  /// visible voxels at all.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "octree::bounded_queue"))]
  pub fn mark_displayed_by_queue(&mut self, max_queue_size: usize) -> bool {
    for node in &mut self.nodes {
      node.displayed = true;
    }

    let root = self.root;
    if self.node(root).metrics.ratio_of_visibility == 0.0 {
      self.node_mut(root).displayed = false;
      return false;
    }

    let mut queue = BinaryHeap::new();
    queue.push(QueueEntry::new(root, self.node(root)));

    while !queue.is_empty() && queue.len() < max_queue_size {
      let Some(entry) = queue.pop() else {
        break;
      };
      let Some(children) = self.children(entry.id) else {
        continue;
      };
      self.node_mut(entry.id).displayed = false;
      for child in children {
        let node = self.node(child);
        if !node.metrics.empty {
          queue.push(QueueEntry::new(child, node));
        }
      }
    }
    true
  }

  /// Append the nodes to draw under `policy`, back-to-front for `viewer`.
  pub fn select_into(&self, policy: &SelectionPolicy, viewer: Vec3, out: &mut Vec<NodeId>) {
    let mut stack: SmallVec<[NodeId; 64]> = smallvec![self.root];

    while let Some(id) = stack.pop() {
      let node = self.node(id);
      if node.metrics.ratio_of_visibility == 0.0 {
        continue;
      }
      if node.is_leaf() || policy.selects(node) {
        out.push(id);
        continue;
      }
      if let Some(children) = self.sorted_children(id, viewer) {
        // Farthest child on top of the stack.
        stack.extend(children.into_iter().rev());
      }
    }
  }

  /// Nodes to draw under `policy`, back-to-front for `viewer`.
  pub fn select(&self, policy: &SelectionPolicy, viewer: Vec3) -> Vec<NodeId> {
    let mut out = Vec::new();
    self.select_into(policy, viewer, &mut out);
    out
  }
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;
