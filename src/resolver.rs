use std::collections::HashMap;

use crate::config::{AppConfig, BuildingRecord, Coordinate};

/// Building label to coordinate lookup; labels not in the table get the default
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    records: HashMap<String, BuildingRecord>,
    default: Coordinate,
}

impl CoordinateResolver {
    pub fn new(records: impl IntoIterator<Item = BuildingRecord>, default: Coordinate) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.label.clone(), record))
            .collect();
        Self { records, default }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.buildings.iter().cloned(), config.default_coordinate)
    }

    pub fn resolve(&self, label: &str) -> Coordinate {
        self.records
            .get(label)
            .map(BuildingRecord::coordinate)
            .unwrap_or(self.default)
    }

    pub fn record(&self, label: &str) -> Option<&BuildingRecord> {
        self.records.get(label)
    }

    pub fn default_coordinate(&self) -> Coordinate {
        self.default
    }
}
