#![allow(unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from campusnav for tests
pub use campusnav::{
    AppConfig, BoundingBox, DetectionCandidate, DistanceEstimate, LocateError, Locator,
    SelectionResult,
};
