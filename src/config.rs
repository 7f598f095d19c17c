use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const BUILTIN_CONFIG: &str = include_str!("../config/default.toml");

/// Process-wide configuration, immutable after [`AppConfig::load`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub camera: CameraIntrinsics,
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub selection: SelectionThresholds,
    #[serde(default)]
    pub fallback: FallbackConfig,
    pub default_coordinate: Coordinate,
    pub buildings: Vec<BuildingRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub focal_length_mm: f64,
    pub sensor_height_mm: f64,
    pub image_height_px: u32,
    /// Height of the lens above the ground plane
    pub mount_height_m: f64,
}

impl CameraIntrinsics {
    /// Focal length in pixels for an image of the given pixel height
    pub fn focal_length_px(&self, image_height_px: f64) -> f64 {
        (self.focal_length_mm / self.sensor_height_mm) * image_height_px
    }

    /// Focal length in pixels at the calibrated image height
    pub fn reference_focal_length_px(&self) -> f64 {
        self.focal_length_px(self.image_height_px as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Ordered label list; the classifier returns an index into it
    pub labels: Vec<String>,
    #[serde(default = "default_classifier_input")]
    pub input_size: u32,
    #[serde(default)]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub model: Option<PathBuf>,
    #[serde(default = "default_detector_input")]
    pub input_size: u32,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
    #[serde(default = "default_max_detections")]
    pub max_detections: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: None,
            input_size: default_detector_input(),
            confidence_threshold: default_confidence_threshold(),
            iou_threshold: default_iou_threshold(),
            max_detections: default_max_detections(),
        }
    }
}

/// Ground-plane plausibility test for primary detector candidates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionThresholds {
    pub min_height_fraction: f64,
    pub min_bottom_fraction: f64,
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self {
            min_height_fraction: 0.1,
            min_bottom_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// L-infinity radius of the closing kernel (12 gives a 25x25 square)
    pub closing_radius: u8,
    pub min_height_fraction: f64,
    pub min_bottom_fraction: f64,
    pub min_area_fraction: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            closing_radius: 12,
            min_height_fraction: 0.3,
            min_bottom_fraction: 0.7,
            min_area_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub label: String,
    /// Physical height; not used by the distance formula
    pub height_m: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl BuildingRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

fn default_classifier_input() -> u32 {
    224
}

fn default_detector_input() -> u32 {
    640
}

fn default_confidence_threshold() -> f32 {
    0.25
}

fn default_iou_threshold() -> f32 {
    0.45
}

fn default_max_detections() -> usize {
    300
}

impl AppConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Configuration shipped with the crate (campus table and phone camera constants)
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_camera()?;
        self.validate_tables()?;
        self.validate_thresholds()
    }

    pub fn building(&self, label: &str) -> Option<&BuildingRecord> {
        self.buildings.iter().find(|b| b.label == label)
    }

    fn validate_camera(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(camera.focal_length_mm) {
            return Err(ConfigError::Camera(format!(
                "focal_length_mm must be positive, got {}",
                camera.focal_length_mm
            )));
        }
        if !positive(camera.sensor_height_mm) {
            return Err(ConfigError::Camera(format!(
                "sensor_height_mm must be positive, got {}",
                camera.sensor_height_mm
            )));
        }
        if camera.image_height_px == 0 {
            return Err(ConfigError::Camera("image_height_px must be positive".to_string()));
        }
        if !positive(camera.mount_height_m) {
            return Err(ConfigError::Camera(format!(
                "mount_height_m must be positive, got {}",
                camera.mount_height_m
            )));
        }
        Ok(())
    }

    /// Every classifier label needs exactly one building record
    fn validate_tables(&self) -> Result<(), ConfigError> {
        if self.classifier.labels.is_empty() {
            return Err(ConfigError::NoLabels);
        }

        let mut labels = HashSet::new();
        for label in &self.classifier.labels {
            if !labels.insert(label.as_str()) {
                return Err(ConfigError::DuplicateLabel(label.clone()));
            }
        }

        let mut buildings = HashSet::new();
        for building in &self.buildings {
            if !buildings.insert(building.label.as_str()) {
                return Err(ConfigError::DuplicateBuilding(building.label.clone()));
            }
            if !building.coordinate().in_range() {
                return Err(ConfigError::CoordinateOutOfRange {
                    label: building.label.clone(),
                    latitude: building.latitude,
                    longitude: building.longitude,
                });
            }
        }

        if let Some(missing) = self
            .classifier
            .labels
            .iter()
            .find(|l| !buildings.contains(l.as_str()))
        {
            return Err(ConfigError::MissingBuilding(missing.clone()));
        }

        if !self.default_coordinate.in_range() {
            return Err(ConfigError::CoordinateOutOfRange {
                label: "default".to_string(),
                latitude: self.default_coordinate.latitude,
                longitude: self.default_coordinate.longitude,
            });
        }

        Ok(())
    }

    fn validate_thresholds(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("selection.min_height_fraction", self.selection.min_height_fraction),
            ("selection.min_bottom_fraction", self.selection.min_bottom_fraction),
            ("fallback.min_height_fraction", self.fallback.min_height_fraction),
            ("fallback.min_bottom_fraction", self.fallback.min_bottom_fraction),
            ("fallback.min_area_fraction", self.fallback.min_area_fraction),
            ("detector.confidence_threshold", self.detector.confidence_threshold as f64),
            ("detector.iou_threshold", self.detector.iou_threshold as f64),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Threshold { name, value });
            }
        }

        if self.fallback.canny_low > self.fallback.canny_high {
            return Err(ConfigError::Threshold {
                name: "fallback.canny_low",
                value: self.fallback.canny_low as f64,
            });
        }
        if !self.fallback.blur_sigma.is_finite() || self.fallback.blur_sigma <= 0.0 {
            return Err(ConfigError::Threshold {
                name: "fallback.blur_sigma",
                value: self.fallback.blur_sigma as f64,
            });
        }
        if self.classifier.input_size == 0 {
            return Err(ConfigError::Threshold { name: "classifier.input_size", value: 0.0 });
        }
        if self.detector.input_size == 0 {
            return Err(ConfigError::Threshold { name: "detector.input_size", value: 0.0 });
        }

        Ok(())
    }
}
