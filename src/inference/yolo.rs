use std::path::Path;

use anyhow::Context;
use image::imageops::FilterType;
use image::DynamicImage;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;
use tracing::debug;

use super::ObjectDetector;
use crate::config::DetectorConfig;
use crate::models::{BoundingBox, DetectionCandidate};

/// A raw detection in model input coordinates, before scaling back to the image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub confidence: f32,
    pub class_id: u32,
}

/// YOLOv8-style single-output detector backed by an `rten` model
///
/// Input is `[1, 3, size, size]` RGB in `[0, 1]`; output is `[1, 4 + classes, anchors]`
/// with rows `cx, cy, w, h` followed by per-class scores.
pub struct RtenYoloDetector {
    model: Model,
    config: DetectorConfig,
}

impl RtenYoloDetector {
    pub fn load(path: &Path, config: DetectorConfig) -> anyhow::Result<Self> {
        let model = Model::load_file(path)
            .with_context(|| format!("Failed to load detector model {}", path.display()))?;
        Ok(Self { model, config })
    }

    fn prepare_input(&self, image: &DynamicImage) -> NdTensor<f32, 4> {
        let size = self.config.input_size;
        let plane = (size * size) as usize;
        let resized = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();

        let mut data = vec![0.0f32; plane * 3];
        for (i, pixel) in resized.pixels().enumerate() {
            for (c, value) in pixel.0.iter().enumerate() {
                data[c * plane + i] = *value as f32 / 255.0;
            }
        }

        NdTensor::from_data([1, 3, size as usize, size as usize], data)
    }
}

impl ObjectDetector for RtenYoloDetector {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<DetectionCandidate>> {
        let input = self.prepare_input(image);
        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow::anyhow!("Detector inference failed: {}", e))?;
        let predictions: NdTensor<f32, 3> = output
            .try_into()
            .map_err(|_| anyhow::anyhow!("Detector output is not a rank-3 float tensor"))?;

        let [_, rows, anchors] = predictions.shape();
        if rows <= 4 {
            anyhow::bail!("Detector output has {} rows, expected box + class scores", rows);
        }

        let mut raw = Vec::new();
        for a in 0..anchors {
            let scores = (4..rows).map(|r| predictions[[0, r, a]]);
            let Some(class_idx) = super::classifier::argmax(scores) else {
                continue;
            };
            let confidence = predictions[[0, 4 + class_idx, a]];
            if confidence < self.config.confidence_threshold {
                continue;
            }
            raw.push(RawDetection {
                cx: predictions[[0, 0, a]],
                cy: predictions[[0, 1, a]],
                w: predictions[[0, 2, a]],
                h: predictions[[0, 3, a]],
                confidence,
                class_id: class_idx as u32,
            });
        }
        debug!("{} anchors above confidence {}", raw.len(), self.config.confidence_threshold);

        let kept = non_max_suppression(raw, self.config.iou_threshold, self.config.max_detections);
        let scale_x = image.width() as f32 / self.config.input_size as f32;
        let scale_y = image.height() as f32 / self.config.input_size as f32;

        Ok(kept
            .iter()
            .filter_map(|d| to_candidate(d, scale_x, scale_y, image.width(), image.height()))
            .collect())
    }
}

fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let (ax1, ay1, ax2, ay2) = (a.cx - a.w / 2.0, a.cy - a.h / 2.0, a.cx + a.w / 2.0, a.cy + a.h / 2.0);
    let (bx1, by1, bx2, by2) = (b.cx - b.w / 2.0, b.cy - b.h / 2.0, b.cx + b.w / 2.0, b.cy + b.h / 2.0);

    let iw = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
    let ih = (ay2.min(by2) - ay1.max(by1)).max(0.0);
    let intersection = iw * ih;
    let union = a.w * a.h + b.w * b.h - intersection;

    if union <= 0.0 { 0.0 } else { intersection / union }
}

/// Class-aware greedy NMS
///
/// Output is sorted by descending confidence, which becomes the emission order
/// seen by the box selector.
pub fn non_max_suppression(mut detections: Vec<RawDetection>, iou_threshold: f32, max_detections: usize) -> Vec<RawDetection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawDetection> = Vec::new();
    for d in detections {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == d.class_id && iou(k, &d) > iou_threshold);
        if !suppressed {
            kept.push(d);
        }
    }
    kept
}

/// Scale a detection to image pixels and clamp it; zero-sized boxes are dropped
pub fn to_candidate(d: &RawDetection, scale_x: f32, scale_y: f32, image_width: u32, image_height: u32) -> Option<DetectionCandidate> {
    let clamp_x = |v: f32| (v * scale_x).clamp(0.0, image_width as f32) as u32;
    let clamp_y = |v: f32| (v * scale_y).clamp(0.0, image_height as f32) as u32;

    let x1 = clamp_x(d.cx - d.w / 2.0);
    let y1 = clamp_y(d.cy - d.h / 2.0);
    let x2 = clamp_x(d.cx + d.w / 2.0);
    let y2 = clamp_y(d.cy + d.h / 2.0);

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(DetectionCandidate::new(
        BoundingBox::new(x1, y1, x2 - x1, y2 - y1),
        d.confidence,
        d.class_id,
    ))
}
