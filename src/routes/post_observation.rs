//! `POST /observations`: the data-entry form's submission endpoint.
//!
//! The submission is checked for data-quality issues, given a location name
//! (reverse geocoded when none was typed), stored, and returned classified.
//! Failures echo the submission back so the form can be re-filled.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::error::RepositoryError;
use crate::geocode::UNKNOWN_LOCATION;
use crate::models::NewObservation;
use crate::quality;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/observations", post(handler))
}

async fn handler(
    State(state): State<AppState>,
    Json(mut submission): Json<NewObservation>,
) -> Response {
    // ---
    info!("POST /observations");

    if submission.needs_location() {
        let name = match submission.coordinates() {
            Some((latitude, longitude)) => {
                state.resolver.reverse_geocode(latitude, longitude).await
            }
            None => UNKNOWN_LOCATION.to_string(),
        };
        submission.location = Some(name);
    }

    let location = submission.location.clone().unwrap_or_default();
    let issues = quality::inspect(&submission.reading(), submission.latitude, submission.longitude);
    quality::log_issues(&location, &issues);

    match state.repository.insert(submission.clone()).await {
        Ok(stored) => {
            state.cache.invalidate();
            let row = stored.classified(&state.thresholds);
            info!(
                id = %row.observation.id,
                status = %row.status,
                "Stored observation for {}",
                location
            );
            (StatusCode::CREATED, Json(row)).into_response()
        }
        Err(e @ RepositoryError::ValidationRejected(_)) => {
            warn!("Storage rejected observation: {}", e);
            rejection(StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), &submission)
        }
        Err(e @ RepositoryError::Unavailable(_)) => {
            error!("Failed to store observation: {}", e);
            rejection(StatusCode::SERVICE_UNAVAILABLE, e.to_string(), &submission)
        }
    }
}

fn rejection(status: StatusCode, message: String, submission: &NewObservation) -> Response {
    (status, Json(json!({ "error": message, "submitted": submission }))).into_response()
}
