//! Storage boundary for observations.
//!
//! The service only needs two operations from storage: read every row and
//! insert one. Both backends implement [`ObservationRepository`] so handlers
//! never know which one they are talking to.

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::{NewObservation, Observation};

mod memory;
mod postgres;

pub use memory::MemoryObservationRepository;
pub use postgres::PgObservationRepository;

// ---

#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// Every stored observation, oldest first.
    async fn fetch_all(&self) -> Result<Vec<Observation>, RepositoryError>;

    /// Persist a submission. The repository assigns the id, and the
    /// timestamp when none was given.
    async fn insert(&self, observation: NewObservation) -> Result<Observation, RepositoryError>;
}
