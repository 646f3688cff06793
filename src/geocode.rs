//! Reverse geocoding of coordinates to a display name.
//!
//! Lookups are best effort. Any failure is logged and turned into
//! [`UNKNOWN_LOCATION`] so a submission is never blocked by the geocoder.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

// ---

/// Placeholder name used whenever a location cannot be resolved.
pub const UNKNOWN_LOCATION: &str = "Unknown";

#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Name for the given coordinates, or [`UNKNOWN_LOCATION`].
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> String;
}

/// Resolver used when no geocoding service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLocationResolver;

#[async_trait]
impl LocationResolver for NoopLocationResolver {
    async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> String {
        UNKNOWN_LOCATION.to_string()
    }
}

/// Nominatim-compatible reverse geocoder.
#[derive(Debug, Clone)]
pub struct HttpLocationResolver {
    client: reqwest::Client,
    base_url: String,
}

/// The part of a `/reverse?format=jsonv2` response we use. Nominatim answers
/// `{"error": "..."}` with a 200 for points it cannot place.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

impl HttpLocationResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // ---
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, reqwest::Error> {
        // ---
        let url = format!("{}/reverse", self.base_url);
        let response: ReverseResponse = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}

#[async_trait]
impl LocationResolver for HttpLocationResolver {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> String {
        // ---
        match self.lookup(latitude, longitude).await {
            Ok(Some(name)) => {
                tracing::debug!(latitude, longitude, "Resolved location: {}", name);
                name
            }
            Ok(None) => {
                tracing::info!(latitude, longitude, "Geocoder has no name for these coordinates");
                UNKNOWN_LOCATION.to_string()
            }
            Err(e) => {
                tracing::warn!(latitude, longitude, "Reverse geocoding failed: {}", e);
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[tokio::test]
    async fn test_noop_resolver_returns_placeholder() {
        // ---
        let name = NoopLocationResolver.reverse_geocode(-1.29, 36.82).await;
        assert_eq!(name, "Unknown");
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_degrades_to_placeholder() {
        // ---
        // Nothing listens on the discard port; the lookup must fail quietly
        let resolver =
            HttpLocationResolver::new("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        assert_eq!(resolver.base_url, "http://127.0.0.1:9");

        let name = resolver.reverse_geocode(-1.29, 36.82).await;
        assert_eq!(name, UNKNOWN_LOCATION);
    }

    #[test]
    fn test_reverse_response_parsing() {
        // ---
        let found: ReverseResponse =
            serde_json::from_str(r#"{"place_id": 1, "display_name": "Nairobi, Kenya"}"#).unwrap();
        assert_eq!(found.display_name.as_deref(), Some("Nairobi, Kenya"));

        let missing: ReverseResponse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert!(missing.display_name.is_none());
    }
}
