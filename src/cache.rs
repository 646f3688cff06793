//! Time-boxed cache of repository reads.
//!
//! Owned by the HTTP layer and injected through `AppState`. The last good
//! snapshot is also the fallback served while the repository is down.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::models::Observation;
use crate::repository::ObservationRepository;

// ---

/// Result of a cached fetch. `warning` is set whenever the repository could
/// not be reached; `stale` when the rows come from an older snapshot.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub rows: Arc<Vec<Observation>>,
    pub stale: bool,
    pub warning: Option<String>,
}

#[derive(Debug)]
struct Snapshot {
    rows: Arc<Vec<Observation>>,
    fetched_at: Instant,
    valid: bool,
}

/// Mutex-guarded state. `generation` is bumped by every invalidation, so a
/// fetch that started before an insert cannot publish its rows as fresh.
#[derive(Debug, Default)]
struct Slot {
    snapshot: Option<Snapshot>,
    generation: u64,
}

#[derive(Debug)]
pub struct FetchCache {
    ttl: Duration,
    slot: Mutex<Slot>,
}

impl FetchCache {
    /// A zero `ttl` makes every fetch hit the repository.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch all observations, serving a fresh snapshot when possible.
    ///
    /// Never fails: on repository errors the last snapshot (or nothing) is
    /// returned along with a warning.
    pub async fn fetch(&self, repository: &dyn ObservationRepository) -> Fetched {
        // ---
        if let Some(rows) = self.fresh_rows() {
            tracing::debug!("Serving {} observations from cache", rows.len());
            return Fetched {
                rows,
                stale: false,
                warning: None,
            };
        }

        let started_at = self.lock().generation;

        match repository.fetch_all().await {
            Ok(rows) => {
                let rows = Arc::new(rows);
                let mut slot = self.lock();
                let valid = slot.generation == started_at;
                if !valid {
                    tracing::debug!("Cache invalidated during fetch; rows kept as fallback");
                }
                slot.snapshot = Some(Snapshot {
                    rows: Arc::clone(&rows),
                    fetched_at: Instant::now(),
                    valid,
                });
                Fetched {
                    rows,
                    stale: false,
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch observations: {}", e);
                let warning = Some(format!("Failed to fetch data: {e}"));
                match self.lock().snapshot.as_ref() {
                    Some(snapshot) => Fetched {
                        rows: Arc::clone(&snapshot.rows),
                        stale: true,
                        warning,
                    },
                    None => Fetched {
                        rows: Arc::new(Vec::new()),
                        stale: false,
                        warning,
                    },
                }
            }
        }
    }

    /// Force the next fetch to hit the repository, including fetches already
    /// in flight. The old snapshot is kept as an outage fallback.
    pub fn invalidate(&self) {
        // ---
        let mut slot = self.lock();
        slot.generation += 1;
        if let Some(snapshot) = slot.snapshot.as_mut() {
            snapshot.valid = false;
        }
    }

    fn fresh_rows(&self) -> Option<Arc<Vec<Observation>>> {
        // ---
        if self.ttl.is_zero() {
            return None;
        }
        self.lock()
            .snapshot
            .as_ref()
            .filter(|s| s.valid && s.fetched_at.elapsed() < self.ttl)
            .map(|s| Arc::clone(&s.rows))
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
