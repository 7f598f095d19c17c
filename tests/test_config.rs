mod common;

use std::io::Write;

use campusnav::ConfigError;
use common::*;

const MINIMAL: &str = r#"
[camera]
focal_length_mm = 4.0
sensor_height_mm = 4.8
image_height_px = 1080
mount_height_m = 1.2

[classifier]
labels = ["Gym", "Hall"]

[default_coordinate]
latitude = 0.0
longitude = 0.0

[[buildings]]
label = "Gym"
height_m = 8.0
latitude = 10.0
longitude = 20.0

[[buildings]]
label = "Hall"
height_m = 12.0
latitude = 10.5
longitude = 20.5
"#;

#[test]
fn test_builtin_config_is_valid() {
    let config = builtin_config();

    assert_eq!(
        config.classifier.labels,
        ["Library", "CS_Building", "Civil", "EnM", "New_Building", "Admin_Block"]
    );
    assert_eq!(config.buildings.len(), 6);
    assert_eq!(config.camera.image_height_px, 3024);
    assert_eq!(config.camera.mount_height_m, 1.6);
    assert_eq!(config.default_coordinate.latitude, 40.0);
    assert_eq!(config.default_coordinate.longitude, -73.0);
    assert_eq!(config.building("Library").map(|b| b.height_m), Some(6.0));
}

#[test]
fn test_optional_sections_take_defaults() -> anyhow::Result<()> {
    let config = AppConfig::from_toml_str(MINIMAL)?;

    assert_eq!(config.classifier.input_size, 224);
    assert_eq!(config.detector.input_size, 640);
    assert_eq!(config.detector.confidence_threshold, 0.25);
    assert_eq!(config.selection.min_height_fraction, 0.1);
    assert_eq!(config.selection.min_bottom_fraction, 0.5);
    assert_eq!(config.fallback.closing_radius, 12);
    assert_eq!(config.fallback.min_area_fraction, 0.1);
    assert!(config.classifier.model.is_none());
    Ok(())
}

#[test]
fn test_load_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    file.write_all(MINIMAL.as_bytes())?;

    let config = AppConfig::load(file.path())?;
    assert_eq!(config.classifier.labels, ["Gym", "Hall"]);
    Ok(())
}

#[test]
fn test_missing_file() {
    let result = AppConfig::load(std::path::Path::new("/nonexistent/campusnav.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_label_without_building_is_rejected() {
    let toml = MINIMAL.replace(r#"labels = ["Gym", "Hall"]"#, r#"labels = ["Gym", "Hall", "Pool"]"#);
    let result = AppConfig::from_toml_str(&toml);
    assert!(matches!(result, Err(ConfigError::MissingBuilding(label)) if label == "Pool"));
}

#[test]
fn test_duplicate_label_is_rejected() {
    let toml = MINIMAL.replace(r#"labels = ["Gym", "Hall"]"#, r#"labels = ["Gym", "Gym"]"#);
    let result = AppConfig::from_toml_str(&toml);
    assert!(matches!(result, Err(ConfigError::DuplicateLabel(label)) if label == "Gym"));
}

#[test]
fn test_duplicate_building_is_rejected() {
    let toml = MINIMAL.replace(r#"label = "Hall""#, r#"label = "Gym""#);
    let result = AppConfig::from_toml_str(&toml);
    assert!(matches!(result, Err(ConfigError::DuplicateBuilding(_))));
}

#[test]
fn test_empty_labels_rejected() {
    let toml = MINIMAL.replace(r#"labels = ["Gym", "Hall"]"#, "labels = []");
    assert!(matches!(AppConfig::from_toml_str(&toml), Err(ConfigError::NoLabels)));
}

#[test]
fn test_invalid_camera_rejected() {
    let toml = MINIMAL.replace("sensor_height_mm = 4.8", "sensor_height_mm = 0.0");
    assert!(matches!(AppConfig::from_toml_str(&toml), Err(ConfigError::Camera(_))));

    let toml = MINIMAL.replace("image_height_px = 1080", "image_height_px = 0");
    assert!(matches!(AppConfig::from_toml_str(&toml), Err(ConfigError::Camera(_))));
}

#[test]
fn test_coordinate_out_of_range_rejected() {
    let toml = MINIMAL.replace("latitude = 10.5", "latitude = 95.0");
    assert!(matches!(
        AppConfig::from_toml_str(&toml),
        Err(ConfigError::CoordinateOutOfRange { .. })
    ));
}

#[test]
fn test_bad_threshold_rejected() {
    let toml = format!("{}\n[selection]\nmin_height_fraction = 1.5\nmin_bottom_fraction = 0.5\n", MINIMAL);
    assert!(matches!(
        AppConfig::from_toml_str(&toml),
        Err(ConfigError::Threshold { name: "selection.min_height_fraction", .. })
    ));
}

#[test]
fn test_malformed_toml_rejected() {
    assert!(matches!(
        AppConfig::from_toml_str("[camera\nfocal_length_mm = "),
        Err(ConfigError::Parse(_))
    ));
}
