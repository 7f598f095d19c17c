//! Seams to the learned models
//!
//! The locator only depends on the two traits below. The `rten` adapters load
//! converted `.rten` model files; tests substitute fixed implementations.

pub mod classifier;
pub mod yolo;

use image::DynamicImage;

use crate::models::DetectionCandidate;

pub use classifier::RtenClassifier;
pub use yolo::RtenYoloDetector;

/// Names the building in an image
pub trait BuildingClassifier: Send + Sync {
    /// Index into the configured classifier label list
    fn classify(&self, image: &DynamicImage) -> anyhow::Result<usize>;
}

/// Proposes candidate boxes for objects in an image
pub trait ObjectDetector: Send + Sync {
    /// Candidates in emission order; may be empty
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<DetectionCandidate>>;
}
