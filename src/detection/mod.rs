pub mod preprocessing;
pub mod contours;
pub mod selector;
pub mod fallback;

use std::sync::Arc;

use image::DynamicImage;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::LocateError;
use crate::inference::ObjectDetector;
use crate::models::{BoundingBox, SelectionResult};
use crate::pipeline::DetectionContext;

pub use fallback::FallbackDetector;
pub use selector::BoxSelector;

/// One way of producing a building box for an image
pub trait BoxStrategy: Send + Sync {
    /// `NoCandidate` hands the image to the next strategy in the chain
    fn locate_box(&self, image: &DynamicImage, context: &DetectionContext) -> Result<SelectionResult, LocateError>;

    /// Short name, reported as the box source
    fn name(&self) -> &str;
}

/// Learned detector followed by the ground-plane box selector
pub struct PrimaryStrategy {
    detector: Arc<dyn ObjectDetector>,
    selector: BoxSelector,
}

impl PrimaryStrategy {
    pub fn new(detector: Arc<dyn ObjectDetector>, selector: BoxSelector) -> Self {
        Self { detector, selector }
    }
}

impl BoxStrategy for PrimaryStrategy {
    fn locate_box(&self, image: &DynamicImage, _context: &DetectionContext) -> Result<SelectionResult, LocateError> {
        let candidates = self.detector.detect(image)?;
        debug!("Primary detector returned {} candidates", candidates.len());
        Ok(self.selector.select(&candidates, image.height()))
    }

    fn name(&self) -> &str {
        "primary"
    }
}

/// Ordered list of box strategies; the first one to return a box wins
pub struct DetectorChain {
    strategies: Vec<Arc<dyn BoxStrategy>>,
}

impl DetectorChain {
    pub fn new() -> Self {
        Self { strategies: Vec::new() }
    }

    /// Primary detector, then the contour fallback, configured from `config`
    pub fn standard(config: &AppConfig, detector: Arc<dyn ObjectDetector>) -> Self {
        Self::new()
            .add_strategy(Arc::new(PrimaryStrategy::new(detector, BoxSelector::new(config.selection))))
            .add_strategy(Arc::new(FallbackDetector::new(config.fallback)))
    }

    pub fn add_strategy(mut self, strategy: Arc<dyn BoxStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn add_strategy_boxed(mut self, strategy: Box<dyn BoxStrategy>) -> Self {
        self.strategies.push(Arc::from(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Returns the chosen box and the name of the strategy that produced it
    pub fn run(&self, image: &DynamicImage, context: &DetectionContext) -> Result<(BoundingBox, String), LocateError> {
        for strategy in &self.strategies {
            match strategy.locate_box(image, context)? {
                SelectionResult::Selected(bbox) => return Ok((bbox, strategy.name().to_string())),
                SelectionResult::NoCandidate => {
                    debug!("Strategy {} found no candidate", strategy.name());
                }
            }
        }
        Err(LocateError::NoDetectionPossible)
    }
}

impl Default for DetectorChain {
    fn default() -> Self {
        Self::new()
    }
}
