//! Back-to-front ordering shared by octree children and scene bricks.

use glam::Vec3;

use crate::bounds::BoundingBox;

/// Sort `items` farthest-first by minimum distance from `viewer` to each
/// item's box.
///
/// Items tied at the smallest distance keep their relative order, except
/// that one whose box contains the viewer is moved to the very end. A viewer
/// inside a box therefore always draws that box last.
pub fn sort_back_to_front<T>(items: &mut [T], viewer: Vec3, bounds: impl Fn(&T) -> BoundingBox) {
  if items.len() < 2 {
    return;
  }
  let distance = |item: &T| bounds(item).distance_to_point(viewer);
  items.sort_by(|a, b| distance(b).total_cmp(&distance(a)));

  let nearest = distance(&items[items.len() - 1]);
  let tied_from = items
    .iter()
    .position(|item| distance(item) == nearest)
    .unwrap_or(items.len() - 1);

  if let Some(offset) = items[tied_from..]
    .iter()
    .position(|item| bounds(item).contains_point(viewer))
  {
    items[tied_from + offset..].rotate_left(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unit_at(x: f32) -> BoundingBox {
    BoundingBox::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0))
  }

  #[test]
  fn test_farthest_first() {
    let mut boxes = vec![unit_at(0.0), unit_at(4.0), unit_at(2.0)];
    sort_back_to_front(&mut boxes, Vec3::new(-3.0, 0.5, 0.5), |b| *b);
    let order: Vec<f32> = boxes.iter().map(|b| b.min.x).collect();
    assert_eq!(order, vec![4.0, 2.0, 0.0]);
  }

  /// Two boxes sharing a face both report distance 0 for a viewer on that
  /// face; the one listed first that contains it goes last.
  #[test]
  fn test_containing_box_moves_to_end() {
    let mut boxes = vec![unit_at(0.0), unit_at(1.0), unit_at(5.0)];
    let viewer = Vec3::new(1.0, 0.5, 0.5);
    sort_back_to_front(&mut boxes, viewer, |b| *b);
    let order: Vec<f32> = boxes.iter().map(|b| b.min.x).collect();
    assert_eq!(order, vec![5.0, 1.0, 0.0]);
  }

  #[test]
  fn test_viewer_inside_one_box_draws_it_last() {
    let mut boxes = vec![unit_at(0.0), unit_at(2.0), unit_at(-2.0)];
    sort_back_to_front(&mut boxes, Vec3::new(0.5, 0.5, 0.5), |b| *b);
    assert_eq!(boxes[2].min.x, 0.0);
  }
}
