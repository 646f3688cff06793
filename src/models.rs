//! Data models for land observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::{classify, Reading, Status, Thresholds};
use crate::geocode::UNKNOWN_LOCATION;
use crate::quality::{self, QualityIssue};

// ---

/// A persisted sensor observation for one location at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Observation {
    // ---
    pub id: Uuid,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub soil_moisture: f64,
    pub vegetation_index: f64,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

/// An observation as submitted, before storage assigns an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObservation {
    // ---
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub soil_moisture: f64,
    pub vegetation_index: f64,
    pub temperature: f64,
    /// Submission time is used when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Observation joined with its derived status, as shown in the data table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedObservation {
    // ---
    #[serde(flatten)]
    pub observation: Observation,
    pub status: Status,
    pub suggestion: &'static str,
    pub quality_issues: Vec<QualityIssue>,
}

/// A map marker; only produced for observations with both coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    // ---
    pub id: Uuid,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Status,
    pub suggestion: &'static str,
}

impl Observation {
    // ---
    pub fn reading(&self) -> Reading {
        Reading::new(self.soil_moisture, self.vegetation_index, self.temperature)
    }

    /// `(latitude, longitude)` when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn quality_issues(&self) -> Vec<QualityIssue> {
        quality::inspect(&self.reading(), self.latitude, self.longitude)
    }

    pub fn classified(self, thresholds: &Thresholds) -> ClassifiedObservation {
        // ---
        let status = classify(&self.reading(), thresholds).status;
        let quality_issues = self.quality_issues();

        ClassifiedObservation {
            observation: self,
            status,
            suggestion: status.suggestion(),
            quality_issues,
        }
    }

    pub fn map_marker(&self, thresholds: &Thresholds) -> Option<MapMarker> {
        // ---
        let (latitude, longitude) = self.coordinates()?;
        let status = classify(&self.reading(), thresholds).status;

        Some(MapMarker {
            id: self.id,
            location: self.location.clone(),
            latitude,
            longitude,
            status,
            suggestion: status.suggestion(),
        })
    }
}

impl NewObservation {
    // ---
    pub fn reading(&self) -> Reading {
        Reading::new(self.soil_moisture, self.vegetation_index, self.temperature)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// True when no usable location name was submitted.
    pub fn needs_location(&self) -> bool {
        self.location
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
    }

    /// Materialize the record with a storage-assigned id. Missing fields get
    /// their defaults: `now` for the timestamp, the placeholder for the name.
    pub fn into_observation(self, id: Uuid, now: DateTime<Utc>) -> Observation {
        // ---
        let location = match self.location {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => UNKNOWN_LOCATION.to_string(),
        };

        Observation {
            id,
            location,
            latitude: self.latitude,
            longitude: self.longitude,
            soil_moisture: self.soil_moisture,
            vegetation_index: self.vegetation_index,
            temperature: self.temperature,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn create_test_submission(location: Option<&str>) -> NewObservation {
        // ---
        NewObservation {
            location: location.map(String::from),
            latitude: Some(-1.2921),
            longitude: Some(36.8219),
            soil_moisture: 45.0,
            vegetation_index: 0.55,
            temperature: 24.0,
            timestamp: None,
        }
    }

    #[test]
    fn test_defaults_applied_on_materialize() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let id = Uuid::new_v4();
        let observation = create_test_submission(Some("  ")).into_observation(id, now);

        assert_eq!(observation.id, id);
        assert_eq!(observation.location, "Unknown");
        assert_eq!(observation.timestamp, now);
    }

    #[test]
    fn test_submitted_fields_preserved() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let taken = Utc.with_ymd_and_hms(2025, 5, 30, 6, 0, 0).unwrap();
        let mut submission = create_test_submission(Some("Nairobi"));
        submission.timestamp = Some(taken);

        let observation = submission.into_observation(Uuid::new_v4(), now);

        assert_eq!(observation.location, "Nairobi");
        assert_eq!(observation.timestamp, taken);
        assert_eq!(observation.coordinates(), Some((-1.2921, 36.8219)));
        assert_eq!(observation.soil_moisture, 45.0);
    }

    #[test]
    fn test_needs_location() {
        // ---
        assert!(create_test_submission(None).needs_location());
        assert!(create_test_submission(Some("")).needs_location());
        assert!(!create_test_submission(Some("Kisumu")).needs_location());
    }

    #[test]
    fn test_missing_coordinate_has_no_marker() {
        // ---
        let mut submission = create_test_submission(Some("Field 7"));
        submission.longitude = None;
        let observation = submission.into_observation(Uuid::new_v4(), Utc::now());

        assert_eq!(observation.coordinates(), None);
        assert!(observation.map_marker(&Thresholds::default()).is_none());

        let row = observation.classified(&Thresholds::default());
        assert_eq!(row.status, Status::Healthy);
        assert_eq!(row.quality_issues, vec![QualityIssue::MissingCoordinates]);
    }

    #[test]
    fn test_submission_json_optional_fields() {
        // ---
        let json = r#"{"soil_moisture": 12.5, "vegetation_index": 0.2, "temperature": 37.0}"#;
        let submission: NewObservation = serde_json::from_str(json).unwrap();

        assert!(submission.location.is_none());
        assert!(submission.coordinates().is_none());
        assert!(submission.timestamp.is_none());
    }
}
