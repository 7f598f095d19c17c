use anyhow::Context as _;
use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

use crate::config::FallbackConfig;
use crate::detection::{contours, preprocessing, BoxStrategy};
use crate::error::LocateError;
use crate::models::{BoundingBox, Contour, SelectionResult};
use crate::pipeline::DetectionContext;

/// Classical edge/contour detector used when the primary detector has nothing
///
/// Grayscale, blur, Canny, closing, then the bounding rectangles of the outermost
/// contours. Thresholds are stricter than the primary selector's because contour
/// evidence is noisier.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDetector {
    pub config: FallbackConfig,
}

impl FallbackDetector {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    /// Run preprocessing and return every external contour of the closed edge map
    pub fn contours(&self, image: &DynamicImage, context: &DetectionContext) -> Result<Vec<Contour>, LocateError> {
        let gray = preprocessing::to_grayscale(image);
        save_stage(context, 1, "grayscale", &gray)?;

        let blurred = preprocessing::apply_blur(&gray, self.config.blur_sigma);
        save_stage(context, 2, "blur", &blurred)?;

        let edges = preprocessing::detect_edges(&blurred, self.config.canny_low, self.config.canny_high);
        save_stage(context, 3, "edges", &edges)?;

        let closed = preprocessing::close_gaps(&edges, self.config.closing_radius);
        save_stage(context, 4, "closed", &closed)?;

        Ok(contours::find_external_contours(&closed))
    }

    pub fn passes(&self, contour: &Contour, image_width: u32, image_height: u32) -> bool {
        let img_h = image_height as f64;
        let img_area = img_h * image_width as f64;
        contour.height() as f64 > self.config.min_height_fraction * img_h
            && contour.bottom() as f64 >= self.config.min_bottom_fraction * img_h
            && contour.area() as f64 > self.config.min_area_fraction * img_area
    }

    /// Pick a box among contours: first passing one, else the largest by area
    pub fn choose(&self, contours: &[Contour], image_width: u32, image_height: u32) -> Option<BoundingBox> {
        if let Some(c) = contours.iter().find(|c| self.passes(c, image_width, image_height)) {
            return Some(c.to_bbox());
        }

        // rev() so the first of equal areas wins
        contours
            .iter()
            .rev()
            .max_by_key(|c| c.area())
            .map(Contour::to_bbox)
    }

    pub fn detect(&self, image: &DynamicImage, context: &DetectionContext) -> Result<BoundingBox, LocateError> {
        let found = self.contours(image, context)?;
        debug!("Found {} external contours", found.len());

        self.choose(&found, image.width(), image.height())
            .ok_or(LocateError::NoDetectionPossible)
    }
}

impl BoxStrategy for FallbackDetector {
    fn locate_box(&self, image: &DynamicImage, context: &DetectionContext) -> Result<SelectionResult, LocateError> {
        info!("Falling back to contour-based detection");
        self.detect(image, context).map(SelectionResult::Selected)
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

fn save_stage(context: &DetectionContext, index: usize, stage: &str, img: &GrayImage) -> Result<(), LocateError> {
    let Some(dir) = context.debug_dir() else {
        return Ok(());
    };

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create debug directory {}", dir.display()))?;
    let filename = format!("{:02}_{}.png", index, stage);
    img.save(dir.join(&filename))
        .with_context(|| format!("Failed to save debug image {}", filename))?;
    debug!("Debug: saved {}/{}", dir.display(), filename);

    Ok(())
}
