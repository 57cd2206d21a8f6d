use super::*;
use crate::synthetic;
use crate::transfer::TransferFunction;

fn scored_brick(volume: &VoxelVolume, region: Region, tf: &TransferFunction) -> Brick {
  let mut brick = Brick::new(volume, region, 4);
  let lookup = tf.bind(volume).unwrap();
  brick.recompute_metrics(volume, &lookup, CostModel::default());
  brick
}

// =========================================================================
// Batch 1: Placement
// =========================================================================

#[test]
fn test_world_box_follows_fractional_position() {
  let volume = VoxelVolume::filled([64, 32, 32], 0)
    .unwrap()
    .with_scale(Vec3::splat(0.5))
    .with_origin(Vec3::new(10.0, 0.0, 0.0));
  let brick = Brick::new(&volume, Region::new(32, 0, 16, 32, 32, 16), 4);

  let aabb = brick.bounding_box();
  assert_eq!(aabb.min, Vec3::new(26.0, 0.0, 8.0));
  assert_eq!(aabb.max, Vec3::new(42.0, 16.0, 16.0));
  assert_eq!(brick.center(), Vec3::new(34.0, 8.0, 12.0));
  assert_eq!(brick.bounding_sphere().radius, aabb.diagonal() * 0.5);

  let root = brick.octree().root_node();
  assert_eq!(root.volume_box, aabb);
  assert_eq!(root.region, *brick.region());
}

// =========================================================================
// Batch 2: Metrics and Selection
// =========================================================================

#[test]
fn test_empty_flag_follows_root() {
  let volume = synthetic::split_x([16, 8, 8], 8, 200, 0).unwrap();
  let tf = TransferFunction::step(128);

  let visible = scored_brick(&volume, Region::new(0, 0, 0, 8, 8, 8), &tf);
  assert!(!visible.is_empty());

  let hidden = scored_brick(&volume, Region::new(8, 0, 0, 8, 8, 8), &tf);
  assert!(hidden.is_empty());
  assert!(hidden
    .select_nodes(1, &SelectionPolicy::RatioThreshold(0.5), Vec3::ZERO, 1.0)
    .is_empty());
}

#[test]
fn test_queue_prepass_marks_invisible_brick_empty() {
  let volume = VoxelVolume::filled([8, 8, 8], 10).unwrap();
  let mut brick = Brick::new(&volume, Region::from_size([8, 8, 8]), 4);
  // Metrics never computed: ratio is 0 everywhere.
  assert!(!brick.determine_oc_nodes_to_display(4));
  assert!(brick.is_empty());
  assert!(!brick.octree().root_node().displayed);
}

#[test]
fn test_drawable_geometry_and_delta() {
  let volume = VoxelVolume::filled([8, 8, 8], 200)
    .unwrap()
    .with_scale(Vec3::splat(2.0));
  let brick = scored_brick(&volume, Region::from_size([8, 8, 8]), &TransferFunction::step(128));

  let drawn = brick.select_nodes(3, &SelectionPolicy::RatioThreshold(0.5), Vec3::splat(-1.0), 2.0);
  assert_eq!(drawn.len(), 1);
  let node = &drawn[0];
  assert_eq!(node.brick, 3);
  assert_eq!(node.node, NodeId::ROOT);
  assert_eq!(node.level, 0);
  assert_eq!(node.texture_box, BoundingBox::UNIT);
  assert_eq!(node.corners[7], Vec3::splat(16.0));
  assert_eq!(node.texture_corners[1], Vec3::new(1.0, 0.0, 0.0));

  // Diagonal of a 16-unit cube over (8 voxels * 2.0).
  let expected = (3.0f32 * 256.0).sqrt() / 16.0;
  assert!((node.delta - expected).abs() < 1e-5);
}

#[test]
fn test_interactive_doubles_delta() {
  let volume = VoxelVolume::filled([8, 8, 8], 200).unwrap();
  let mut brick = scored_brick(&volume, Region::from_size([8, 8, 8]), &TransferFunction::step(128));
  let policy = SelectionPolicy::RatioThreshold(0.5);

  let still = brick.select_nodes(0, &policy, Vec3::ZERO, 1.0)[0].delta;
  brick.set_interactive(true);
  let moving = brick.select_nodes(0, &policy, Vec3::ZERO, 1.0)[0].delta;
  assert_eq!(moving, still * 2.0);
}

// =========================================================================
// Batch 3: Display State
// =========================================================================

#[test]
fn test_down_sampling_changed_is_consumed() {
  let volume = VoxelVolume::filled([8, 8, 8], 0).unwrap();
  let mut brick = Brick::new(&volume, Region::from_size([8, 8, 8]), 4);

  assert!(!brick.take_down_sampling_changed());
  brick.set_interactive(true);
  brick.set_interactive(true);
  assert!(brick.is_interactive());
  assert!(brick.take_down_sampling_changed());
  assert!(!brick.take_down_sampling_changed());

  brick.set_interactive(false);
  assert!(brick.take_down_sampling_changed());
}

#[test]
fn test_slices() {
  let volume = VoxelVolume::filled([8, 4, 8], 0).unwrap();
  let mut brick = Brick::new(&volume, Region::from_size([8, 4, 8]), 4);
  assert!(brick.active_slices().is_empty());

  brick.set_slice(Axis::Y, Some(1)).unwrap();
  brick.set_slice(Axis::X, Some(0)).unwrap();
  let planes = brick.active_slices();
  assert_eq!(planes.len(), 2);
  assert_eq!(planes[0].axis, Axis::X);
  assert_eq!(planes[0].texture, 0.0625);
  assert_eq!(planes[0].world, 0.5);
  assert_eq!(planes[1].axis, Axis::Y);
  assert_eq!(planes[1].texture, 0.375);
  assert_eq!(planes[1].world, 1.5);

  brick.set_slice(Axis::X, None).unwrap();
  assert_eq!(brick.slice(Axis::X), None);
  assert_eq!(brick.active_slices().len(), 1);
}

#[test]
fn test_slice_out_of_range() {
  let volume = VoxelVolume::filled([8, 4, 8], 0).unwrap();
  let mut brick = Brick::new(&volume, Region::from_size([8, 4, 8]), 4);
  assert_eq!(
    brick.set_slice(Axis::Y, Some(4)),
    Err(Error::IndexOutOfBounds {
      index: [0, 4, 0],
      size: [8, 4, 8],
    })
  );
  assert_eq!(brick.slice(Axis::Y), None);
}
