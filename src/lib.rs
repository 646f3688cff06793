//! Land health monitoring backend.
//!
//! The classification core ([`classifier`], [`aggregator`]) is pure and
//! synchronous. Storage, reverse geocoding and the fetch cache are injected
//! into the HTTP layer through [`routes::AppState`].

pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod geocode;
pub mod models;
pub mod quality;
pub mod repository;
pub mod routes;
pub mod schema;

pub use aggregator::{evaluate, AlertReport, FleetMeans, RowAssessment};
pub use classifier::{classify, Classification, Reading, Status, Thresholds, Tier};
pub use config::{Config, StorageBackend};
pub use error::{RepositoryError, ThresholdError};
pub use geocode::{HttpLocationResolver, LocationResolver, NoopLocationResolver, UNKNOWN_LOCATION};
pub use models::{NewObservation, Observation};
pub use repository::{MemoryObservationRepository, ObservationRepository, PgObservationRepository};
pub use routes::{router, AppState};
