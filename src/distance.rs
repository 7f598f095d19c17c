use serde::{Serialize, Serializer};
use tracing::debug;

use crate::config::CameraIntrinsics;
use crate::models::BoundingBox;

/// Camera-to-building distance, or undefined when the box base is not below the horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceEstimate {
    Meters(f64),
    Undefined,
}

impl DistanceEstimate {
    pub fn meters(&self) -> Option<f64> {
        match self {
            DistanceEstimate::Meters(m) => Some(*m),
            DistanceEstimate::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, DistanceEstimate::Meters(_))
    }
}

// Serialized as a number or null
impl Serialize for DistanceEstimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.meters().serialize(serializer)
    }
}

/// Inverse pinhole projection for a level camera
///
/// The optical axis is assumed to project onto the vertical midline of the image and
/// the building base to rest on the ground plane, `mount_height_m` below the lens.
/// A base at image row `base_y` then lies at
/// `distance = focal_px * mount_height_m / (base_y - image_height / 2)`.
#[derive(Debug, Clone, Copy)]
pub struct DistanceEstimator {
    intrinsics: CameraIntrinsics,
}

impl DistanceEstimator {
    pub fn new(intrinsics: CameraIntrinsics) -> Self {
        Self { intrinsics }
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    /// Estimate distance from the bottom-edge row of the building and the image height
    pub fn estimate(&self, base_y: f64, image_height: u32) -> DistanceEstimate {
        let img_h = image_height as f64;
        let focal_px = self.intrinsics.focal_length_px(img_h);
        let dy = base_y - img_h / 2.0;

        if image_height != self.intrinsics.image_height_px {
            debug!(
                "image height {} differs from calibrated height {}, focal length rescaled",
                image_height, self.intrinsics.image_height_px
            );
        }
        debug!("img_h={}, base_y={}, dy={}, f_px={:.2}", img_h, base_y, dy, focal_px);

        if dy > 0.0 {
            DistanceEstimate::Meters((focal_px * self.intrinsics.mount_height_m) / dy)
        } else {
            DistanceEstimate::Undefined
        }
    }

    pub fn estimate_for_box(&self, bbox: &BoundingBox, image_height: u32) -> DistanceEstimate {
        self.estimate(bbox.bottom() as f64, image_height)
    }
}
