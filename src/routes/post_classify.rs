use axum::{extract::State, routing::post, Json, Router};

use super::AppState;
use crate::classifier::{classify, Classification, Reading};

// ---

pub fn router() -> Router<AppState> {
    Router::new().route("/classify", post(handler))
}

/// Classify a reading without storing it.
async fn handler(
    State(state): State<AppState>,
    Json(reading): Json<Reading>,
) -> Json<Classification> {
    Json(classify(&reading, &state.thresholds))
}
