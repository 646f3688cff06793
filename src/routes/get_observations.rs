//! Read-only observation views: the data table, map markers and the list of
//! rows that cannot be mapped.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{AppState, Listing};
use crate::cache::Fetched;
use crate::classifier::Status;
use crate::models::{ClassifiedObservation, MapMarker};

// ---

const DEFAULT_LIMIT: usize = 1000;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/observations", get(table))
        .route("/observations/map", get(map))
        .route("/observations/missing-coordinates", get(missing_coordinates))
}

/// Query parameters for the data table
#[derive(Debug, Deserialize)]
pub struct ObservationsQuery {
    status: Option<Status>,
    limit: Option<usize>,
}

async fn table(
    Query(params): Query<ObservationsQuery>,
    State(state): State<AppState>,
) -> Json<Listing<ClassifiedObservation>> {
    // ---
    debug!("GET /observations {:?}", params);

    let fetched = state.cache.fetch(state.repository.as_ref()).await;
    let rows: Vec<ClassifiedObservation> = fetched
        .rows
        .iter()
        .cloned()
        .map(|observation| observation.classified(&state.thresholds))
        .filter(|row| params.status.map_or(true, |status| row.status == status))
        .take(params.limit.unwrap_or(DEFAULT_LIMIT))
        .collect();

    info!("Returning {} observations", rows.len());
    Json(listing(rows, fetched))
}

async fn map(State(state): State<AppState>) -> Json<Listing<MapMarker>> {
    // ---
    debug!("GET /observations/map");

    let fetched = state.cache.fetch(state.repository.as_ref()).await;
    let markers: Vec<MapMarker> = fetched
        .rows
        .iter()
        .filter_map(|observation| observation.map_marker(&state.thresholds))
        .collect();

    Json(listing(markers, fetched))
}

async fn missing_coordinates(
    State(state): State<AppState>,
) -> Json<Listing<ClassifiedObservation>> {
    // ---
    debug!("GET /observations/missing-coordinates");

    let fetched = state.cache.fetch(state.repository.as_ref()).await;
    let rows: Vec<ClassifiedObservation> = fetched
        .rows
        .iter()
        .filter(|observation| observation.coordinates().is_none())
        .cloned()
        .map(|observation| observation.classified(&state.thresholds))
        .collect();

    if !rows.is_empty() {
        info!("{} observations have no coordinates", rows.len());
    }
    Json(listing(rows, fetched))
}

fn listing<T>(rows: Vec<T>, fetched: Fetched) -> Listing<T> {
    Listing {
        rows,
        stale: fetched.stale,
        warnings: fetched.warning.into_iter().collect(),
    }
}
