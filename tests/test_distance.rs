mod common;

use campusnav::{CameraIntrinsics, DistanceEstimator};
use common::*;

fn phone_camera() -> CameraIntrinsics {
    CameraIntrinsics {
        focal_length_mm: 6.86,
        sensor_height_mm: 5.6,
        image_height_px: 3024,
        mount_height_m: 1.6,
    }
}

#[test]
fn test_focal_length_in_pixels() {
    let camera = phone_camera();
    assert_close(camera.reference_focal_length_px(), 3704.4, 0.01);
    assert_close(camera.focal_length_px(1512.0), 1852.2, 0.01);
}

#[test]
fn test_distance_formula() {
    let estimator = DistanceEstimator::new(phone_camera());
    let distance = estimator.estimate(2800.0, 3024);

    let meters = distance.meters().expect("distance should be defined");
    assert_close(meters, 4.60, 0.01);
}

#[test]
fn test_base_on_midline_is_undefined() {
    let estimator = DistanceEstimator::new(phone_camera());
    assert_eq!(estimator.estimate(1512.0, 3024), DistanceEstimate::Undefined);
}

#[test]
fn test_base_above_midline_is_undefined() {
    let estimator = DistanceEstimator::new(phone_camera());
    assert_eq!(estimator.estimate(100.0, 3024), DistanceEstimate::Undefined);
    assert_eq!(estimator.estimate(0.0, 3024), DistanceEstimate::Undefined);
}

#[test]
fn test_lower_base_means_closer() {
    let estimator = DistanceEstimator::new(phone_camera());
    let far = estimator.estimate(1600.0, 3024).meters().unwrap();
    let near = estimator.estimate(3000.0, 3024).meters().unwrap();
    assert!(near < far);
    assert!(near > 0.0);
}

#[test]
fn test_estimate_for_box_uses_bottom_edge() {
    let estimator = DistanceEstimator::new(phone_camera());
    let bbox = BoundingBox::new(100, 1000, 500, 1800);

    assert_eq!(
        estimator.estimate_for_box(&bbox, 3024),
        estimator.estimate(2800.0, 3024)
    );
}

#[test]
fn test_undefined_serializes_as_null() -> anyhow::Result<()> {
    assert_eq!(serde_json::to_string(&DistanceEstimate::Undefined)?, "null");
    assert_eq!(serde_json::to_string(&DistanceEstimate::Meters(2.5))?, "2.5");
    Ok(())
}
