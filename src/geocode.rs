//! Forward geocoding
//!
//! Resolves a free-text place name to coordinates. Only the provider's
//! top-ranked candidate is used: there is no disambiguation, locale handling or
//! retry.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::GeocodingConfig;
use crate::models::Coordinates;

/// Resolves a place name; `Ok(None)` means the provider found no candidate
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>>;
}

/// OpenCage response structures
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeocodingCandidate {
    geometry: Geometry,
    formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

impl From<&Geometry> for Coordinates {
    fn from(geometry: &Geometry) -> Self {
        Coordinates::new(geometry.lat, geometry.lng)
    }
}

/// OpenCage forward geocoder
#[derive(Clone)]
pub struct OpenCageGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenCageGeocoder {
    pub fn new(client: Client, config: &GeocodingConfig, api_key: &str) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    #[instrument(skip(self), fields(location = query))]
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        debug!("Geocoding location name: {}", query);

        let url = format!(
            "{}/json?q={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| "Failed to reach geocoding API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Geocoding API error {status}: {error_text}");
        }

        let geocoding: GeocodingResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| "Failed to parse geocoding response")?;

        // Use the first (best) result
        let Some(best) = geocoding.results.first() else {
            warn!("No results found for location '{}'", query);
            return Ok(None);
        };

        let coordinates = Coordinates::from(&best.geometry);
        debug!(
            "Found location: {} ({})",
            best.formatted.as_deref().unwrap_or(query),
            coordinates.format_coordinates()
        );
        Ok(Some(coordinates))
    }
}
