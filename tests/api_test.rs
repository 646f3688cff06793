//! HTTP tests for the landwatch API, driven in-process against the
//! in-memory repository.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use landwatch::{
    AppState, LocationResolver, MemoryObservationRepository, NewObservation,
    NoopLocationResolver, Observation, ObservationRepository, RepositoryError, Thresholds,
};

// ---

/// Resolver with a fixed answer, standing in for a geocoding service.
struct FixedResolver(&'static str);

#[async_trait]
impl LocationResolver for FixedResolver {
    async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> String {
        self.0.to_string()
    }
}

/// Store that refuses every write, like a table with a failing constraint.
struct RejectingRepository;

#[async_trait]
impl ObservationRepository for RejectingRepository {
    async fn fetch_all(&self) -> Result<Vec<Observation>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _observation: NewObservation) -> Result<Observation, RepositoryError> {
        Err(RepositoryError::ValidationRejected("check violation".to_string()))
    }
}

fn observation(
    location: &str,
    coords: Option<(f64, f64)>,
    moisture: f64,
    vegetation: f64,
    temperature: f64,
) -> Observation {
    // ---
    Observation {
        id: Uuid::new_v4(),
        location: location.to_string(),
        latitude: coords.map(|c| c.0),
        longitude: coords.map(|c| c.1),
        soil_moisture: moisture,
        vegetation_index: vegetation,
        temperature,
        timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
    }
}

fn setup_app(
    repo: Arc<MemoryObservationRepository>,
    resolver: Arc<dyn LocationResolver>,
) -> Router {
    // ---
    let state = AppState::new(repo, resolver, Thresholds::default(), Duration::from_secs(60));
    landwatch::router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    // ---
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok((status, body))
}

#[tokio::test]
async fn health_endpoint_ok() -> Result<()> {
    // ---
    let app = setup_app(
        Arc::new(MemoryObservationRepository::new()),
        Arc::new(NoopLocationResolver),
    );

    let (status, body) = send(&app, get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "landwatch");
    Ok(())
}

#[tokio::test]
async fn report_on_empty_store() -> Result<()> {
    // ---
    let app = setup_app(
        Arc::new(MemoryObservationRepository::new()),
        Arc::new(NoopLocationResolver),
    );

    let (status, body) = send(&app, get("/report")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["row_count"], 0);
    assert!(body["fleet_means"].is_null());
    assert_eq!(body["fleet_warning"], false);
    assert_eq!(body["per_row"], json!([]));
    assert_eq!(body["warnings"], json!(["No observations found."]));
    Ok(())
}

#[tokio::test]
async fn report_flags_fleet_and_rows() -> Result<()> {
    // ---
    let rows = vec![
        observation("North field", Some((1.0, 36.0)), 20.0, 0.5, 36.0),
        observation("South field", Some((1.1, 36.1)), 35.0, 0.5, 36.0),
        observation("Orchard", None, 60.0, 0.7, 24.0),
    ];
    let ids: Vec<String> = rows.iter().map(|o| o.id.to_string()).collect();
    let repo = Arc::new(MemoryObservationRepository::with_observations(rows));
    let app = setup_app(repo, Arc::new(NoopLocationResolver));

    let (status, body) = send(&app, get("/report")).await?;
    assert_eq!(status, StatusCode::OK);

    // Mean temperature 32 and mean moisture 38.33: no banner
    assert_eq!(body["fleet_warning"], false);
    assert_eq!(body["missing_coordinates"], 1);

    let per_row = body["per_row"].as_array().unwrap();
    let statuses: Vec<&str> = per_row.iter().map(|r| r["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, vec!["Degraded", "Degraded", "Healthy"]);
    let row_ids: Vec<&str> = per_row
        .iter()
        .map(|r| r["observation_id"].as_str().unwrap())
        .collect();
    assert_eq!(row_ids, ids.iter().map(String::as_str).collect::<Vec<_>>());

    assert_eq!(body["degraded_rows"].as_array().unwrap().len(), 2);
    assert_eq!(body["counts"]["degraded"], 2);
    Ok(())
}

#[tokio::test]
async fn report_banner_lists_breached_axes() -> Result<()> {
    // ---
    let rows = vec![
        observation("Dry ridge", Some((0.0, 0.0)), 10.0, 0.6, 38.0),
        observation("Slope", Some((0.0, 0.1)), 40.0, 0.6, 36.0),
    ];
    let app = setup_app(
        Arc::new(MemoryObservationRepository::with_observations(rows)),
        Arc::new(NoopLocationResolver),
    );

    let (_, body) = send(&app, get("/report")).await?;
    assert_eq!(body["fleet_warning"], true);
    assert_eq!(
        body["fleet_breaches"],
        json!([
            { "axis": "SoilMoisture", "message": "Soil moisture levels are critically low." },
            { "axis": "Temperature", "message": "Temperature levels are too high." }
        ])
    );
    Ok(())
}

#[tokio::test]
async fn outage_keeps_serving_stale_rows() -> Result<()> {
    // ---
    let repo = Arc::new(MemoryObservationRepository::with_observations(vec![observation(
        "Plot 1",
        Some((2.0, 30.0)),
        50.0,
        0.6,
        25.0,
    )]));
    let state = AppState::new(
        repo.clone(),
        Arc::new(NoopLocationResolver),
        Thresholds::default(),
        Duration::ZERO,
    );
    let app = landwatch::router(state);

    let (_, body) = send(&app, get("/observations")).await?;
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["stale"], false);

    repo.set_offline(true);
    let (status, body) = send(&app, get("/report")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stale"], true);
    assert_eq!(body["row_count"], 1);
    assert!(body["warnings"][0].as_str().unwrap().contains("Failed to fetch data"));
    Ok(())
}

#[tokio::test]
async fn submission_is_classified_and_geocoded() -> Result<()> {
    // ---
    let repo = Arc::new(MemoryObservationRepository::new());
    let app = setup_app(repo.clone(), Arc::new(FixedResolver("Machakos, Kenya")));

    // Prime the cache so the insert has something to invalidate
    let (_, body) = send(&app, get("/report")).await?;
    assert_eq!(body["row_count"], 0);

    let submission = json!({
        "latitude": -1.52,
        "longitude": 37.26,
        "soil_moisture": 35.0,
        "vegetation_index": 0.5,
        "temperature": 27.0
    });
    let (status, body) = send(&app, post_json("/observations", &submission)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["location"], "Machakos, Kenya");
    assert_eq!(body["status"], "AtRisk");
    assert_eq!(
        body["suggestion"],
        "Land is at risk: recommend mulching, cover crops, or moderate irrigation."
    );
    assert!(body["id"].is_string());
    assert!(body["timestamp"].is_string());
    assert_eq!(repo.len(), 1);

    let (_, body) = send(&app, get("/report")).await?;
    assert_eq!(body["row_count"], 1);
    Ok(())
}

#[tokio::test]
async fn typed_location_is_not_geocoded() -> Result<()> {
    // ---
    let app = setup_app(
        Arc::new(MemoryObservationRepository::new()),
        Arc::new(FixedResolver("Somewhere else")),
    );

    let submission = json!({
        "location": "Home farm",
        "latitude": 0.1,
        "longitude": 34.7,
        "soil_moisture": 55.0,
        "vegetation_index": 0.7,
        "temperature": 22.0
    });
    let (status, body) = send(&app, post_json("/observations", &submission)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["location"], "Home farm");
    assert_eq!(body["status"], "Healthy");
    assert_eq!(body["quality_issues"], json!([]));
    Ok(())
}

#[tokio::test]
async fn submission_without_coordinates_goes_to_missing_view() -> Result<()> {
    // ---
    let app = setup_app(
        Arc::new(MemoryObservationRepository::new()),
        Arc::new(FixedResolver("Never used")),
    );

    let submission = json!({
        "soil_moisture": 120.0,
        "vegetation_index": 0.5,
        "temperature": 22.0
    });
    let (status, body) = send(&app, post_json("/observations", &submission)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["location"], "Unknown");

    let kinds: Vec<&str> = body["quality_issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["missing_coordinates", "out_of_range"]);

    let (_, map) = send(&app, get("/observations/map")).await?;
    assert_eq!(map["rows"], json!([]));

    let (_, missing) = send(&app, get("/observations/missing-coordinates")).await?;
    assert_eq!(missing["rows"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn submission_during_outage_is_echoed_back() -> Result<()> {
    // ---
    let repo = Arc::new(MemoryObservationRepository::new());
    repo.set_offline(true);
    let app = setup_app(repo, Arc::new(NoopLocationResolver));

    let submission = json!({
        "location": "Terrace",
        "soil_moisture": 45.0,
        "vegetation_index": 0.6,
        "temperature": 21.0
    });
    let (status, body) = send(&app, post_json("/observations", &submission)).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["submitted"]["location"], "Terrace");
    assert_eq!(body["submitted"]["soil_moisture"], 45.0);
    Ok(())
}

#[tokio::test]
async fn storage_rejection_is_echoed_back() -> Result<()> {
    // ---
    let state = AppState::new(
        Arc::new(RejectingRepository),
        Arc::new(NoopLocationResolver),
        Thresholds::default(),
        Duration::from_secs(60),
    );
    let app = landwatch::router(state);

    let submission = json!({
        "location": "Lower terrace",
        "latitude": 0.4,
        "longitude": 35.2,
        "soil_moisture": 28.0,
        "vegetation_index": 0.6,
        "temperature": 21.0
    });
    let (status, body) = send(&app, post_json("/observations", &submission)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "observation rejected by storage: check violation");
    assert_eq!(body["submitted"]["location"], "Lower terrace");
    assert_eq!(body["submitted"]["soil_moisture"], 28.0);
    assert_eq!(body["submitted"]["temperature"], 21.0);
    Ok(())
}

#[tokio::test]
async fn malformed_submission_rejected() -> Result<()> {
    // ---
    let repo = Arc::new(MemoryObservationRepository::new());
    let app = setup_app(repo.clone(), Arc::new(NoopLocationResolver));

    // temperature is required
    let submission = json!({ "soil_moisture": 45.0, "vegetation_index": 0.6 });
    let (status, _) = send(&app, post_json("/observations", &submission)).await?;
    assert!(status.is_client_error());
    assert!(repo.is_empty());
    Ok(())
}

#[tokio::test]
async fn table_filters_by_status() -> Result<()> {
    // ---
    let rows = vec![
        observation("A", Some((0.0, 0.0)), 10.0, 0.6, 20.0),
        observation("B", Some((0.0, 0.0)), 60.0, 0.6, 20.0),
        observation("C", Some((0.0, 0.0)), 12.0, 0.6, 20.0),
    ];
    let app = setup_app(
        Arc::new(MemoryObservationRepository::with_observations(rows)),
        Arc::new(NoopLocationResolver),
    );

    let (_, body) = send(&app, get("/observations?status=Degraded")).await?;
    let locations: Vec<&str> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["location"].as_str().unwrap())
        .collect();
    assert_eq!(locations, vec!["A", "C"]);

    let (_, body) = send(&app, get("/observations?limit=1")).await?;
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, get("/observations/map")).await?;
    assert_eq!(body["rows"][1]["status"], "Healthy");
    Ok(())
}

#[tokio::test]
async fn classify_endpoint() -> Result<()> {
    // ---
    let app = setup_app(
        Arc::new(MemoryObservationRepository::new()),
        Arc::new(NoopLocationResolver),
    );

    let reading = json!({ "soil_moisture": 10.0, "vegetation_index": 0.6, "temperature": 25.0 });
    let (status, body) = send(&app, post_json("/classify", &reading)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Degraded");
    assert_eq!(body["breaches"], json!(["SoilMoisture"]));
    Ok(())
}
