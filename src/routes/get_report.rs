//! `GET /report`: the alert report behind the dashboard banner, metric
//! widgets and per-location alert lines.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::{debug, info};

use super::AppState;
use crate::aggregator::{evaluate, AlertReport};

// ---

/// Alert report plus the conditions met while fetching its input.
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    // ---
    #[serde(flatten)]
    pub report: AlertReport,
    /// Rows lacking a coordinate; they are counted in the means but not mapped.
    pub missing_coordinates: usize,
    pub stale: bool,
    pub warnings: Vec<String>,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/report", get(handler))
}

async fn handler(State(state): State<AppState>) -> Json<DashboardReport> {
    // ---
    debug!("GET /report");

    let fetched = state.cache.fetch(state.repository.as_ref()).await;
    let report = evaluate(&fetched.rows, &state.thresholds);
    let missing_coordinates = fetched
        .rows
        .iter()
        .filter(|row| row.coordinates().is_none())
        .count();

    let mut warnings: Vec<String> = fetched.warning.into_iter().collect();
    if report.row_count == 0 {
        warnings.push("No observations found.".to_string());
    }

    info!(
        rows = report.row_count,
        degraded = report.counts.degraded,
        fleet_warning = report.fleet_warning,
        "Report evaluated"
    );

    Json(DashboardReport {
        report,
        missing_coordinates,
        stale: fetched.stale,
        warnings,
    })
}
