//! Data-quality checks applied at the ingestion boundary.
//!
//! None of these conditions are errors: a flagged observation is stored and
//! classified unchanged. Missing coordinates only keep a row off the map.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::classifier::Reading;

// ---

pub const SOIL_MOISTURE_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const VEGETATION_INDEX_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = -50.0..=60.0;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// A data-quality condition found on one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityIssue {
    /// Latitude or longitude is absent.
    MissingCoordinates,
    /// A value lies outside its expected physical range.
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Inspect a reading and its coordinates.
pub fn inspect(
    reading: &Reading,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Vec<QualityIssue> {
    // ---
    let mut issues = Vec::new();

    if latitude.is_none() || longitude.is_none() {
        issues.push(QualityIssue::MissingCoordinates);
    }

    let checks = [
        ("soil_moisture", Some(reading.soil_moisture), SOIL_MOISTURE_RANGE),
        ("vegetation_index", Some(reading.vegetation_index), VEGETATION_INDEX_RANGE),
        ("temperature", Some(reading.temperature), TEMPERATURE_RANGE),
        ("latitude", latitude, LATITUDE_RANGE),
        ("longitude", longitude, LONGITUDE_RANGE),
    ];

    for (field, value, range) in checks {
        if let Some(value) = value {
            if !range.contains(&value) {
                issues.push(QualityIssue::OutOfRange {
                    field,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
    }

    issues
}

/// Emit one warning per issue for a freshly submitted observation.
pub fn log_issues(location: &str, issues: &[QualityIssue]) {
    // ---
    for issue in issues {
        match issue {
            QualityIssue::MissingCoordinates => {
                tracing::warn!(location, "Observation has no coordinates; left off the map");
            }
            QualityIssue::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                tracing::warn!(
                    location,
                    field,
                    value,
                    "Reading outside expected range [{}, {}]",
                    min,
                    max
                );
            }
        }
    }
}
