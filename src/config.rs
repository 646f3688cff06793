//! Configuration loader for the `landwatch` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
//! Parsing goes through a variable lookup function so the rules can be
//! exercised without touching the process environment.
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::classifier::{Thresholds, Tier};

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Where observations are stored.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    // ---
    /// PostgreSQL `land_data` table.
    Postgres {
        /// PostgreSQL connection string.
        db_url: String,
        /// Maximum number of database connections in the pool.
        db_pool_max: u32,
    },
    /// Process-local store; contents are lost on restart.
    Memory,
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    pub storage: StorageBackend,

    /// HTTP listen port.
    pub listen_port: u16,

    /// How long fetched observations are reused before re-reading storage.
    pub fetch_cache_ttl: Duration,

    /// Base URL of a Nominatim-compatible reverse geocoder, if any.
    pub geocoder_url: Option<String>,

    /// Request timeout for the geocoder.
    pub geocoder_timeout: Duration,

    /// Classification thresholds, already validated.
    pub thresholds: Thresholds,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `LANDWATCH_STORAGE` – `postgres` (default) or `memory`
/// - `DATABASE_URL` – PostgreSQL connection string (required for `postgres`)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `LISTEN_PORT` – HTTP port (default: 8080)
/// - `FETCH_CACHE_SECS` – fetch cache TTL, 0 disables (default: 60)
/// - `GEOCODER_URL` – reverse geocoder base URL (default: none)
/// - `GEOCODER_TIMEOUT_SECS` – geocoder timeout (default: 5)
/// - `DEGRADED_SOIL_MOISTURE`, `DEGRADED_TEMPERATURE`, `DEGRADED_VEGETATION_INDEX`
/// - `AT_RISK_SOIL_MOISTURE`, `AT_RISK_TEMPERATURE`, `AT_RISK_VEGETATION_INDEX`
///
/// Returns an error if any variable is missing or invalid, or if the
/// thresholds are out of order.
pub fn load_from_env() -> Result<Config> {
    load_with(|name| env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let storage = match lookup("LANDWATCH_STORAGE").as_deref().map(str::trim) {
        None | Some("") | Some("postgres") => StorageBackend::Postgres {
            db_url: require_env!(lookup, "DATABASE_URL"),
            db_pool_max: parse_env!(lookup, "DB_POOL_MAX", u32, 5),
        },
        Some("memory") => StorageBackend::Memory,
        Some(other) => {
            return Err(anyhow!(
                "Invalid LANDWATCH_STORAGE: {other} (expected postgres or memory)"
            ))
        }
    };

    let listen_port = parse_env!(lookup, "LISTEN_PORT", u16, 8080);
    let fetch_cache_ttl = Duration::from_secs(parse_env!(lookup, "FETCH_CACHE_SECS", u64, 60));
    let geocoder_url = lookup("GEOCODER_URL")
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    let geocoder_timeout = Duration::from_secs(parse_env!(lookup, "GEOCODER_TIMEOUT_SECS", u64, 5));

    let degraded = Tier {
        soil_moisture_below: parse_env!(
            lookup,
            "DEGRADED_SOIL_MOISTURE",
            f64,
            Thresholds::DEFAULT_DEGRADED.soil_moisture_below
        ),
        temperature_above: parse_env!(
            lookup,
            "DEGRADED_TEMPERATURE",
            f64,
            Thresholds::DEFAULT_DEGRADED.temperature_above
        ),
        vegetation_index_below: parse_env!(
            lookup,
            "DEGRADED_VEGETATION_INDEX",
            f64,
            Thresholds::DEFAULT_DEGRADED.vegetation_index_below
        ),
    };
    let at_risk = Tier {
        soil_moisture_below: parse_env!(
            lookup,
            "AT_RISK_SOIL_MOISTURE",
            f64,
            Thresholds::DEFAULT_AT_RISK.soil_moisture_below
        ),
        temperature_above: parse_env!(
            lookup,
            "AT_RISK_TEMPERATURE",
            f64,
            Thresholds::DEFAULT_AT_RISK.temperature_above
        ),
        vegetation_index_below: parse_env!(
            lookup,
            "AT_RISK_VEGETATION_INDEX",
            f64,
            Thresholds::DEFAULT_AT_RISK.vegetation_index_below
        ),
    };
    let thresholds =
        Thresholds::new(degraded, at_risk).map_err(|e| anyhow!("Invalid thresholds: {}", e))?;

    Ok(Config {
        storage,
        listen_port,
        fetch_cache_ttl,
        geocoder_url,
        geocoder_timeout,
        thresholds,
    })
}

/// Mask the password in a connection string, keeping user and host.
fn mask_db_url(db_url: &str) -> String {
    // ---
    if let Some(at_pos) = db_url.rfind('@') {
        if let Some(colon_pos) = db_url[..at_pos].rfind(':') {
            // Only a colon after the scheme separator delimits a password
            if db_url[..colon_pos].contains("//") {
                return format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..]);
            }
        }
    }
    db_url.to_string()
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        match &self.storage {
            StorageBackend::Postgres {
                db_url,
                db_pool_max,
            } => {
                tracing::info!("  STORAGE          : postgres");
                tracing::info!("  DATABASE_URL     : {}", mask_db_url(db_url));
                tracing::info!("  DB_POOL_MAX      : {}", db_pool_max);
            }
            StorageBackend::Memory => {
                tracing::info!("  STORAGE          : memory");
            }
        }
        tracing::info!("  LISTEN_PORT      : {}", self.listen_port);
        tracing::info!("  FETCH_CACHE_SECS : {}", self.fetch_cache_ttl.as_secs());
        tracing::info!(
            "  GEOCODER_URL     : {}",
            self.geocoder_url.as_deref().unwrap_or("(none)")
        );
        tracing::info!("  DEGRADED TIER    : {:?}", self.thresholds.degraded());
        tracing::info!("  AT-RISK TIER     : {:?}", self.thresholds.at_risk());
    }
}
