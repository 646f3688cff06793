//! Fleet statistics and alert evaluation.
//!
//! [`evaluate`] classifies every observation individually and, in the same
//! pass, accumulates the fleet means. The fleet warning is derived from the
//! means alone and can fire even when no single row is Degraded.

use serde::Serialize;
use uuid::Uuid;

use crate::classifier::{classify, Axis, Reading, Status, Thresholds};
use crate::models::Observation;

// ---

/// Row-level outcome for one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowAssessment {
    // ---
    pub observation_id: Uuid,
    pub location: String,
    pub status: Status,
    pub suggestion: &'static str,
    pub breaches: Vec<Axis>,
}

/// Means across all evaluated observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FleetMeans {
    // ---
    pub mean_soil_moisture: f64,
    pub mean_temperature: f64,
    pub mean_vegetation_index: f64,
}

/// Fold the `count`-th reading into a running mean. Both terms are divided
/// before subtracting, so finite readings never overflow to infinity.
fn running_mean(mean: f64, value: f64, count: f64) -> f64 {
    mean + (value / count - mean / count)
}

impl FleetMeans {
    fn add(&mut self, reading: &Reading, count: f64) {
        // ---
        self.mean_soil_moisture =
            running_mean(self.mean_soil_moisture, reading.soil_moisture, count);
        self.mean_temperature = running_mean(self.mean_temperature, reading.temperature, count);
        self.mean_vegetation_index =
            running_mean(self.mean_vegetation_index, reading.vegetation_index, count);
    }

    pub fn as_reading(&self) -> Reading {
        Reading::new(
            self.mean_soil_moisture,
            self.mean_vegetation_index,
            self.mean_temperature,
        )
    }
}

/// An axis whose fleet mean crossed the Degraded threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetBreach {
    pub axis: Axis,
    pub message: &'static str,
}

/// Number of rows per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub healthy: usize,
    pub at_risk: usize,
    pub degraded: usize,
}

impl StatusCounts {
    fn record(&mut self, status: Status) {
        match status {
            Status::Healthy => self.healthy += 1,
            Status::AtRisk => self.at_risk += 1,
            Status::Degraded => self.degraded += 1,
        }
    }
}

/// Everything the dashboard needs to render alerts for a set of observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    // ---
    pub row_count: usize,
    /// One entry per input observation, in input order.
    pub per_row: Vec<RowAssessment>,
    /// `None` when there were no observations.
    pub fleet_means: Option<FleetMeans>,
    pub fleet_warning: bool,
    pub fleet_breaches: Vec<FleetBreach>,
    /// Degraded entries of `per_row`, in input order.
    pub degraded_rows: Vec<RowAssessment>,
    pub counts: StatusCounts,
}

/// Evaluate a fully fetched collection of observations.
pub fn evaluate(observations: &[Observation], thresholds: &Thresholds) -> AlertReport {
    // ---
    let mut per_row = Vec::with_capacity(observations.len());
    let mut counts = StatusCounts::default();
    let mut means = FleetMeans {
        mean_soil_moisture: 0.0,
        mean_temperature: 0.0,
        mean_vegetation_index: 0.0,
    };

    for (index, observation) in observations.iter().enumerate() {
        let reading = observation.reading();
        means.add(&reading, (index + 1) as f64);

        let classification = classify(&reading, thresholds);
        counts.record(classification.status);
        per_row.push(RowAssessment {
            observation_id: observation.id,
            location: observation.location.clone(),
            status: classification.status,
            suggestion: classification.suggestion,
            breaches: classification.breaches,
        });
    }

    let fleet_means = (!observations.is_empty()).then_some(means);

    let fleet_breaches: Vec<FleetBreach> = fleet_means
        .map(|means| thresholds.degraded().breaches(&means.as_reading()))
        .unwrap_or_default()
        .into_iter()
        .map(|axis| FleetBreach {
            axis,
            message: axis.alert_message(),
        })
        .collect();

    let degraded_rows = per_row
        .iter()
        .filter(|row| row.status == Status::Degraded)
        .cloned()
        .collect();

    AlertReport {
        row_count: observations.len(),
        per_row,
        fleet_means,
        fleet_warning: !fleet_breaches.is_empty(),
        fleet_breaches,
        degraded_rows,
        counts,
    }
}
