//! HTTP routes gateway.
//!
//! Each sibling module exports a subrouter; this gateway merges them and
//! attaches the shared [`AppState`].

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use serde::Serialize;

use crate::cache::FetchCache;
use crate::classifier::Thresholds;
use crate::geocode::LocationResolver;
use crate::repository::ObservationRepository;

mod get_observations;
mod get_report;
mod health;
mod post_classify;
mod post_observation;

pub use get_report::DashboardReport;

// ---

/// Collaborators shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    // ---
    pub repository: Arc<dyn ObservationRepository>,
    pub resolver: Arc<dyn LocationResolver>,
    pub cache: Arc<FetchCache>,
    pub thresholds: Thresholds,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn ObservationRepository>,
        resolver: Arc<dyn LocationResolver>,
        thresholds: Thresholds,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            resolver,
            cache: Arc::new(FetchCache::new(cache_ttl)),
            thresholds,
        }
    }
}

/// Rows returned by the list endpoints, with fetch status alongside.
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub stale: bool,
    pub warnings: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(get_report::router())
        .merge(get_observations::router())
        .merge(post_observation::router())
        .merge(post_classify::router())
        .merge(health::router())
        .with_state(state)
}
