use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::ObservationRepository;
use crate::error::RepositoryError;
use crate::models::{NewObservation, Observation};

// ---

/// In-process store used in development mode and by tests.
///
/// Mirrors the PostgreSQL table constraints: non-finite readings are
/// rejected. Can be switched offline to exercise outage handling.
#[derive(Debug, Default)]
pub struct MemoryObservationRepository {
    rows: Mutex<Vec<Observation>>,
    offline: AtomicBool,
}

impl MemoryObservationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observations(rows: Vec<Observation>) -> Self {
        Self {
            rows: Mutex::new(rows),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate the backing store going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn rows(&self) -> MutexGuard<'_, Vec<Observation>> {
        // Rows are only ever pushed, so a poisoned lock still holds valid data
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ObservationRepository for MemoryObservationRepository {
    async fn fetch_all(&self) -> Result<Vec<Observation>, RepositoryError> {
        // ---
        self.ensure_online()?;

        let mut rows = self.rows().clone();
        rows.sort_by_key(|row| row.timestamp);
        Ok(rows)
    }

    async fn insert(&self, observation: NewObservation) -> Result<Observation, RepositoryError> {
        // ---
        self.ensure_online()?;

        if let Some(axis) = observation.reading().non_finite_axis() {
            return Err(RepositoryError::ValidationRejected(format!(
                "{} must be a finite number",
                axis.field_name()
            )));
        }

        let record = observation.into_observation(Uuid::new_v4(), Utc::now());
        self.rows().push(record.clone());
        Ok(record)
    }
}
