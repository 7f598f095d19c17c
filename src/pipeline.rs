use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::detection::DetectorChain;
use crate::distance::{DistanceEstimate, DistanceEstimator};
use crate::error::LocateError;
use crate::inference::{BuildingClassifier, ObjectDetector};
use crate::models::BoundingBox;
use crate::resolver::CoordinateResolver;

/// Debug configuration for locator runs
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Per-request context handed to every box strategy
#[derive(Clone, Debug)]
pub struct DetectionContext {
    pub request_id: Uuid,
    pub debug: Option<DebugConfig>,
}

impl DetectionContext {
    pub fn new(request_id: Uuid) -> Self {
        Self { request_id, debug: None }
    }

    /// Directory for this request's intermediate images, when debug mode is on
    pub fn debug_dir(&self) -> Option<PathBuf> {
        self.debug
            .as_ref()
            .filter(|d| d.enabled)
            .map(|d| d.output_dir.join(self.request_id.to_string()))
    }
}

/// Successful result record
#[derive(Debug, Clone, Serialize)]
pub struct LocationReport {
    pub request_id: Uuid,
    pub building: String,
    /// Meters, or null when the box base is not below the image midline
    pub distance: DistanceEstimate,
    pub latitude: f64,
    pub longitude: f64,
    pub bbox: BoundingBox,
    /// Name of the strategy that produced `bbox`
    pub box_source: String,
}

/// Error record returned in place of a [`LocationReport`]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub status: u16,
}

impl From<&LocateError> for ErrorReport {
    fn from(err: &LocateError) -> Self {
        let error = match err {
            LocateError::Internal(e) => format!("Error processing the image: {}", e),
            other => other.to_string(),
        };
        Self { error, status: err.status() }
    }
}

/// Decode an uploaded payload, rejecting empty or unreadable input
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, LocateError> {
    if bytes.is_empty() {
        return Err(LocateError::InvalidInput("The file is empty.".to_string()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| LocateError::InvalidInput(format!("Failed to decode image: {}", e)))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(LocateError::InvalidInput("Image has zero size".to_string()));
    }

    Ok(img)
}

/// Classifies the building, picks its box, and assembles the location report
pub struct Locator {
    classifier: Arc<dyn BuildingClassifier>,
    chain: DetectorChain,
    estimator: DistanceEstimator,
    resolver: CoordinateResolver,
    labels: Vec<String>,
    debug: Option<DebugConfig>,
}

impl Locator {
    /// Standard locator: primary detector, contour fallback, configured tables
    pub fn new(
        config: &AppConfig,
        classifier: Arc<dyn BuildingClassifier>,
        detector: Arc<dyn ObjectDetector>,
    ) -> Self {
        Self::with_chain(config, classifier, DetectorChain::standard(config, detector))
    }

    pub fn with_chain(config: &AppConfig, classifier: Arc<dyn BuildingClassifier>, chain: DetectorChain) -> Self {
        Self {
            classifier,
            chain,
            estimator: DistanceEstimator::new(config.camera),
            resolver: CoordinateResolver::from_config(config),
            labels: config.classifier.labels.clone(),
            debug: None,
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    /// Decode and locate one uploaded image
    pub fn locate_bytes(&self, bytes: &[u8]) -> Result<LocationReport, LocateError> {
        let img = decode_image(bytes).inspect_err(|e| error!("{}", e))?;
        self.locate(&img)
    }

    pub fn locate(&self, img: &DynamicImage) -> Result<LocationReport, LocateError> {
        let context = DetectionContext {
            request_id: Uuid::new_v4(),
            debug: self.debug.clone(),
        };
        let span = tracing::info_span!("locate", request_id = %context.request_id);
        let _enter = span.enter();

        info!("Image shape: {}x{}", img.width(), img.height());

        let result = self.run(img, &context);
        if let Err(e) = &result {
            error!("Locating building failed: {}", e);
        }
        result
    }

    fn run(&self, img: &DynamicImage, context: &DetectionContext) -> Result<LocationReport, LocateError> {
        let idx = self.classifier.classify(img)?;
        let label = self.labels.get(idx).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "Classifier returned index {} but only {} labels are configured",
                idx,
                self.labels.len()
            )
        })?;
        debug!("Classified as {} (index {})", label, idx);

        let (bbox, box_source) = self.chain.run(img, context)?;
        debug!("Selected box {:?} from {}", bbox, box_source);

        let distance = self.estimator.estimate_for_box(&bbox, img.height());
        let coordinate = self.resolver.resolve(&label);

        info!(
            "Detected building: {}, Distance: {:?}, Latitude: {}, Longitude: {}",
            label,
            distance.meters(),
            coordinate.latitude,
            coordinate.longitude
        );

        Ok(LocationReport {
            request_id: context.request_id,
            building: label,
            distance,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            bbox,
            box_source,
        })
    }
}
