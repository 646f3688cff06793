use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::ObservationRepository;
use crate::error::RepositoryError;
use crate::models::{NewObservation, Observation};

// ---

/// Observations stored in the PostgreSQL `land_data` table.
#[derive(Debug, Clone)]
pub struct PgObservationRepository {
    pool: PgPool,
}

impl PgObservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ObservationRepository for PgObservationRepository {
    async fn fetch_all(&self) -> Result<Vec<Observation>, RepositoryError> {
        // ---
        let rows = sqlx::query_as::<_, Observation>(
            r#"
            SELECT id, location, latitude, longitude,
                   soil_moisture, vegetation_index, temperature, timestamp
              FROM land_data
             ORDER BY timestamp, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("Fetched {} observations from land_data", rows.len());
        Ok(rows)
    }

    async fn insert(&self, observation: NewObservation) -> Result<Observation, RepositoryError> {
        // ---
        let record = observation.into_observation(Uuid::new_v4(), Utc::now());

        let stored = sqlx::query_as::<_, Observation>(
            r#"
            INSERT INTO land_data (
                id, location, latitude, longitude,
                soil_moisture, vegetation_index, temperature, timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, location, latitude, longitude,
                      soil_moisture, vegetation_index, temperature, timestamp
            "#,
        )
        .bind(record.id)
        .bind(&record.location)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.soil_moisture)
        .bind(record.vegetation_index)
        .bind(record.temperature)
        .bind(record.timestamp)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Inserted observation {} ({})", stored.id, stored.location);
        Ok(stored)
    }
}
