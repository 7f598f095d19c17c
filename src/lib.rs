pub mod config;
pub mod detection;
pub mod distance;
pub mod error;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod resolver;

pub use config::{AppConfig, BuildingRecord, CameraIntrinsics, Coordinate};
pub use detection::{BoxSelector, BoxStrategy, DetectorChain, FallbackDetector};
pub use distance::{DistanceEstimate, DistanceEstimator};
pub use error::{ConfigError, LocateError};
pub use inference::{BuildingClassifier, ObjectDetector};
pub use models::{BoundingBox, Contour, DetectionCandidate, SelectionResult};
pub use pipeline::{decode_image, DebugConfig, DetectionContext, ErrorReport, LocationReport, Locator};
pub use resolver::CoordinateResolver;
