//! Database schema management for `landwatch`.
//!
//! Ensures the observation table exists before serving requests.
//! Applied once on startup from `main.rs` when PostgreSQL storage is selected.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `land_data` table holding raw observations. Derived status is
/// never stored. The CHECK constraints reject NaN and infinite readings
/// (in PostgreSQL NaN sorts above every other value, including Infinity).
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS land_data (
            id               UUID             PRIMARY KEY,
            location         TEXT             NOT NULL,
            latitude         DOUBLE PRECISION,
            longitude        DOUBLE PRECISION,
            soil_moisture    DOUBLE PRECISION NOT NULL
                CHECK (soil_moisture > '-Infinity' AND soil_moisture < 'Infinity'),
            vegetation_index DOUBLE PRECISION NOT NULL
                CHECK (vegetation_index > '-Infinity' AND vegetation_index < 'Infinity'),
            temperature      DOUBLE PRECISION NOT NULL
                CHECK (temperature > '-Infinity' AND temperature < 'Infinity'),
            timestamp        TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_land_data_timestamp
            ON land_data (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
