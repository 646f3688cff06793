//! Error types shared across the service.
//!
//! The classification core itself never fails on finite input; these errors
//! describe invalid threshold configuration and failures of the storage
//! collaborator.

use thiserror::Error;

// ---

/// Errors returned by an [`ObservationRepository`](crate::ObservationRepository).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    // ---
    /// The backing store cannot be reached (connection refused, pool timeout, I/O).
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// The backing store refused the record (constraint violation, bad value).
    #[error("observation rejected by storage: {0}")]
    ValidationRejected(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        // ---
        match err {
            sqlx::Error::Database(db)
                if !matches!(db.kind(), sqlx::error::ErrorKind::Other) =>
            {
                RepositoryError::ValidationRejected(db.message().to_string())
            }
            other => RepositoryError::Unavailable(other.to_string()),
        }
    }
}

/// A threshold set that would let the Degraded tier be milder than the
/// AtRisk tier on some axis.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThresholdError {
    // ---
    #[error("degraded soil moisture cut-off {degraded} exceeds at-risk cut-off {at_risk}")]
    SoilMoisture { degraded: f64, at_risk: f64 },

    #[error("degraded temperature cut-off {degraded} is below at-risk cut-off {at_risk}")]
    Temperature { degraded: f64, at_risk: f64 },

    #[error("degraded vegetation index cut-off {degraded} exceeds at-risk cut-off {at_risk}")]
    VegetationIndex { degraded: f64, at_risk: f64 },
}
