use glam::Vec3;

use super::*;

fn cube_tree(size: usize, leaf_size: usize) -> Octree {
  let volume_box = BoundingBox::new(Vec3::ZERO, Vec3::splat(size as f32));
  Octree::new(Region::from_size([size; 3]), volume_box, leaf_size)
}

// =========================================================================
// Batch 1: Construction
// =========================================================================

/// 8³ with leaf size 4: root plus 8 leaves of 4³.
#[test]
fn test_eight_cube_builds_nine_nodes() {
  let tree = cube_tree(8, 4);
  assert_eq!(tree.len(), 9);
  assert_eq!(tree.depth(), 1);
  assert_eq!(tree.leaves().count(), 8);

  let root = tree.root_node();
  assert!(!root.is_leaf());
  assert_eq!(root.region.size(), [8, 8, 8]);
  for leaf in tree.leaves() {
    assert_eq!(tree.node(leaf).region.size(), [4, 4, 4]);
    assert_eq!(tree.node(leaf).level, 1);
  }
}

#[test]
fn test_full_tree_node_count() {
  // 32 -> 16 -> 8 -> 4
  let tree = cube_tree(32, 4);
  assert_eq!(tree.len(), 1 + 8 + 64 + 512);
  assert_eq!(tree.depth(), 3);
}

/// A small region is a single leaf root.
#[test]
fn test_single_node_tree() {
  let tree = cube_tree(6, 4);
  assert_eq!(tree.len(), 1);
  assert_eq!(tree.depth(), 0);
  assert!(tree.root_node().is_leaf());
  assert_eq!(tree.root_node().which, None);
}

#[test]
fn test_links_are_consistent() {
  let tree = cube_tree(16, 4);
  for (id, node) in tree.iter() {
    if let Some(children) = node.children {
      for (which, child) in children.iter().enumerate() {
        assert!(child > &id, "child {:?} precedes parent {:?}", child, id);
        assert_eq!(tree.parent(*child), Some(id));
        assert_eq!(tree.node(*child).which, Some(which as u8));
        assert_eq!(tree.node(*child).level, node.level + 1);
      }
    }
  }
  assert_eq!(tree.parent(tree.root()), None);
}

// =========================================================================
// Batch 2: Partition and Leaf Criterion
// =========================================================================

/// Leaves of an odd-sized, offset brick cover it exactly once.
#[test]
fn test_leaves_tile_region() {
  let region = Region::new(3, 0, 5, 19, 13, 22);
  let volume_box = BoundingBox::new(Vec3::ZERO, Vec3::new(19.0, 13.0, 22.0));
  let tree = Octree::new(region, volume_box, 4);

  let leaves: Vec<Region> = tree.leaves().map(|id| tree.node(id).region).collect();
  let total: usize = leaves.iter().map(Region::voxel_count).sum();
  assert_eq!(total, region.voxel_count());

  for i in region.column..region.column + region.width {
    for j in region.row..region.row + region.height {
      for k in region.slab..region.slab + region.depth {
        let owners = leaves.iter().filter(|leaf| leaf.contains(i, j, k)).count();
        assert_eq!(owners, 1, "voxel ({}, {}, {})", i, j, k);
      }
    }
  }
}

#[test]
fn test_leaf_criterion_holds_everywhere() {
  for leaf_size in [1, 4, 6] {
    let region = Region::from_size([40, 17, 27]);
    let tree = Octree::new(region, BoundingBox::UNIT, leaf_size);
    for (_, node) in tree.iter() {
      assert_eq!(
        node.is_leaf(),
        node.region.is_leaf(leaf_size),
        "leaf_size {} region {:?}",
        leaf_size,
        node.region
      );
    }
  }
}

// =========================================================================
// Batch 3: Geometry
// =========================================================================

#[test]
fn test_texture_boxes() {
  let tree = cube_tree(8, 4);
  assert_eq!(tree.root_node().texture_box, BoundingBox::UNIT);

  let children = tree.children(tree.root()).unwrap();
  let half = Vec3::splat(0.5);
  assert_eq!(
    tree.node(children[0]).texture_box,
    BoundingBox::new(Vec3::ZERO, half)
  );
  assert_eq!(
    tree.node(children[2]).texture_box,
    BoundingBox::new(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.5, 0.5, 1.0))
  );
  assert_eq!(
    tree.node(children[7]).texture_box,
    BoundingBox::new(half, Vec3::ONE)
  );
}

/// An odd width puts the split point at the low half's share.
#[test]
fn test_weighted_volume_boxes() {
  let region = Region::from_size([10, 8, 8]);
  let volume_box = BoundingBox::new(Vec3::ZERO, Vec3::new(10.0, 8.0, 8.0));
  let tree = Octree::new(region, volume_box, 4);
  let children = tree.children(tree.root()).unwrap();

  // 10 is even: split at 5.
  assert_eq!(tree.node(children[0]).volume_box.max.x, 5.0);

  let region = Region::from_size([9, 8, 8]);
  let volume_box = BoundingBox::new(Vec3::ZERO, Vec3::new(9.0, 8.0, 8.0));
  let tree = Octree::new(region, volume_box, 4);
  let children = tree.children(tree.root()).unwrap();
  let low = tree.node(children[0]);
  let high = tree.node(children[1]);
  assert_eq!(low.region.width, 5);
  assert_eq!(high.region.width, 4);
  assert!((low.volume_box.max.x - 5.0).abs() < 1e-5);
  assert_eq!(low.volume_box.max.x, high.volume_box.min.x);
}

#[test]
fn test_volume_sphere_encloses_box() {
  let tree = cube_tree(16, 4);
  for (_, node) in tree.iter() {
    assert_eq!(node.volume_sphere.center, node.volume_box.center());
    assert_eq!(node.volume_sphere.radius, node.volume_box.diagonal() * 0.5);
  }
}
