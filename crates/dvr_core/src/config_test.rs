use super::*;

// =========================================================================
// Batch 1: Defaults and Validation
// =========================================================================

#[test]
fn test_defaults_are_valid() {
  let config = RenderConfig::default();
  assert!(config.validate().is_ok());
  assert_eq!(config.leaf_size, 4);
  assert_eq!(config.texture_size, 32);
  assert_eq!(
    config.selection_policy().unwrap(),
    SelectionPolicy::RatioThreshold(0.5)
  );
}

#[test]
fn test_validate_rejects_bad_values() {
  let bad = [
    RenderConfig {
      texture_size: 0,
      ..Default::default()
    },
    RenderConfig {
      texture_size: 48,
      ..Default::default()
    },
    RenderConfig {
      leaf_size: 0,
      ..Default::default()
    },
    RenderConfig {
      slice_factor: 0.0,
      ..Default::default()
    },
    RenderConfig {
      slice_factor: f32::NAN,
      ..Default::default()
    },
    RenderConfig {
      ratio_of_visibility_threshold: 1.5,
      ..Default::default()
    },
  ];
  for config in bad {
    assert!(
      matches!(config.validate(), Err(Error::InvalidConfig(_))),
      "{:?} should be rejected",
      config
    );
  }
}

// =========================================================================
// Batch 2: Policy Resolution
// =========================================================================

/// Ratio test wins over the queue test, which wins over the cost test.
#[test]
fn test_policy_tie_break_order() {
  let mut config = RenderConfig {
    ratio_of_visibility_test: true,
    maximum_priority_queue_test: true,
    rendering_cost_function_test: true,
    ratio_of_visibility_threshold: 0.25,
    maximum_priority_queue_size: 7,
    ..Default::default()
  };
  assert_eq!(
    config.selection_policy().unwrap(),
    SelectionPolicy::RatioThreshold(0.25)
  );

  config.ratio_of_visibility_test = false;
  assert_eq!(config.selection_policy().unwrap(), SelectionPolicy::BoundedQueue(7));

  config.maximum_priority_queue_test = false;
  assert_eq!(config.selection_policy().unwrap(), SelectionPolicy::CostFunction);

  config.rendering_cost_function_test = false;
  assert_eq!(config.selection_policy(), Err(Error::NoSelectionPolicy));
}

#[test]
fn test_set_selection_policy_is_exclusive() {
  let mut config = RenderConfig::default();
  config.set_selection_policy(SelectionPolicy::BoundedQueue(3));
  assert!(!config.ratio_of_visibility_test);
  assert!(config.maximum_priority_queue_test);
  assert!(!config.rendering_cost_function_test);
  assert_eq!(config.maximum_priority_queue_size, 3);
  assert_eq!(config.selection_policy().unwrap(), SelectionPolicy::BoundedQueue(3));
}

#[test]
fn test_cost_model() {
  let config = RenderConfig {
    cost_structure: 0.5,
    rendering_cost: 2.0,
    ..Default::default()
  };
  assert_eq!(
    config.cost_model(),
    CostModel {
      cost_structure: 0.5,
      rendering_cost: 2.0
    }
  );
}
