#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use campusnav::{AppConfig, BoundingBox, BuildingClassifier, DetectionCandidate, Locator, ObjectDetector};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Classifier that always answers with the same label index
pub struct FixedClassifier(pub usize);

impl BuildingClassifier for FixedClassifier {
    fn classify(&self, _image: &DynamicImage) -> anyhow::Result<usize> {
        Ok(self.0)
    }
}

/// Detector that always returns the same candidates
pub struct FixedDetector(pub Vec<DetectionCandidate>);

impl ObjectDetector for FixedDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<DetectionCandidate>> {
        Ok(self.0.clone())
    }
}

/// Detector whose inference always fails
pub struct FailingDetector;

impl ObjectDetector for FailingDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<DetectionCandidate>> {
        anyhow::bail!("model crashed")
    }
}

pub fn builtin_config() -> AppConfig {
    AppConfig::builtin().expect("built-in config must be valid")
}

pub fn candidate(x: u32, y: u32, w: u32, h: u32, confidence: f32) -> DetectionCandidate {
    DetectionCandidate::new(BoundingBox::new(x, y, w, h), confidence, 0)
}

/// Locator over the built-in config with fixed model answers
pub fn make_locator(label_index: usize, candidates: Vec<DetectionCandidate>) -> Locator {
    Locator::new(
        &builtin_config(),
        Arc::new(FixedClassifier(label_index)),
        Arc::new(FixedDetector(candidates)),
    )
}

/// Uniform gray image
pub fn blank_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

/// Black image with white filled rectangles, each given as (x, y, w, h)
pub fn rectangles_image(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |px, py| {
        let inside = rects
            .iter()
            .any(|&(x, y, w, h)| px >= x && px < x + w && py >= y && py < y + h);
        Luma([if inside { 255u8 } else { 0u8 }])
    });
    DynamicImage::ImageLuma8(img)
}

pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
