use thiserror::Error;

/// Failures surfaced by [`crate::Locator`]
///
/// An undefined distance is not an error; it is carried by
/// [`crate::distance::DistanceEstimate::Undefined`].
#[derive(Debug, Error)]
pub enum LocateError {
    /// The payload is absent, empty or cannot be decoded as an image
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Neither the primary detector nor contour extraction produced a box
    #[error("no detection possible: no contours found in image")]
    NoDetectionPossible,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LocateError {
    /// HTTP-like status code for error records (4xx client, 5xx server)
    pub fn status(&self) -> u16 {
        match self {
            LocateError::InvalidInput(_) => 400,
            LocateError::NoDetectionPossible => 500,
            LocateError::Internal(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status() < 500
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid camera intrinsics: {0}")]
    Camera(String),

    #[error("classifier label list is empty")]
    NoLabels,

    #[error("duplicate classifier label: {0}")]
    DuplicateLabel(String),

    #[error("duplicate building record: {0}")]
    DuplicateBuilding(String),

    #[error("classifier label {0} has no building record")]
    MissingBuilding(String),

    #[error("coordinate out of range for {label}: ({latitude}, {longitude})")]
    CoordinateOutOfRange {
        label: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("invalid threshold {name}: {value}")]
    Threshold { name: &'static str, value: f64 },
}
