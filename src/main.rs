//! Application entry point for the `landwatch` backend service.
//!
//! This binary orchestrates the full startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Opening the observation store (PostgreSQL pool + schema, or in-memory)
//! - Choosing a reverse geocoder
//! - Mounting all API routes via the `routes` gateway
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `LANDWATCH_STORAGE` (optional) – `postgres` (default) or `memory`
//! - `DATABASE_URL` (**required** for `postgres`) – PostgreSQL connection string
//! - `LANDWATCH_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `LANDWATCH_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the full list.
use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Result;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use landwatch::{
    config, schema, AppState, Config, HttpLocationResolver, LocationResolver,
    MemoryObservationRepository, NoopLocationResolver, ObservationRepository,
    PgObservationRepository, StorageBackend,
};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let repository = open_repository(&cfg).await?;
    let resolver = build_resolver(&cfg)?;

    let state = AppState::new(repository, resolver, cfg.thresholds, cfg.fetch_cache_ttl);
    let app = landwatch::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.listen_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Open the configured observation store.
async fn open_repository(cfg: &Config) -> Result<Arc<dyn ObservationRepository>> {
    // ---
    match &cfg.storage {
        StorageBackend::Postgres {
            db_url,
            db_pool_max,
        } => {
            tracing::info!("Attempting to connect to database");

            let pool = PgPoolOptions::new()
                .max_connections(*db_pool_max)
                .connect(db_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

            tracing::info!("Successfully connected to database");

            schema::create_schema(&pool).await?;
            Ok(Arc::new(PgObservationRepository::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; observations are lost on restart");
            Ok(Arc::new(MemoryObservationRepository::new()))
        }
    }
}

fn build_resolver(cfg: &Config) -> Result<Arc<dyn LocationResolver>> {
    // ---
    match &cfg.geocoder_url {
        Some(url) => Ok(Arc::new(HttpLocationResolver::new(url, cfg.geocoder_timeout)?)),
        None => {
            tracing::info!("No GEOCODER_URL set; unnamed submissions are stored as Unknown");
            Ok(Arc::new(NoopLocationResolver))
        }
    }
}

/// Install the process-wide `tracing` subscriber. Must run before the first
/// log line, which is why `main` calls it right after loading `.env`.
///
/// Output is compact, one line per event, tagged with target, file and line,
/// so repository, geocoder and handler logs can be told apart.
///
/// Knobs, all read from the environment:
/// - `RUST_LOG` takes precedence when set; otherwise `LANDWATCH_LOG_LEVEL`
///   (`trace`..`error`, default `debug`) applies, with sqlx query logging held at `warn`
/// - `LANDWATCH_SPAN_EVENTS=full|enter_exit` adds span lifecycle events; close-only otherwise
/// - `FORCE_COLOR` forces ANSI colour on (`1`/`true`/`yes`) or off (`0`/`false`/`no`);
///   without it colour follows whether stdout is a terminal
fn init_tracing() {
    // ---
    let span_events = match env::var("LANDWATCH_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to LANDWATCH_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("LANDWATCH_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
