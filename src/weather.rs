//! Weather provider client for the OpenWeatherMap One Call API
//!
//! Requests current conditions in metric units with the minutely, hourly, daily
//! and alert blocks excluded. A non-success status is not an error of this
//! step: it is reported as [`WeatherReport::Failed`] and the pipeline decides
//! what to do with it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::{Coordinates, WeatherReport};

pub const EXCLUDED_BLOCKS: &str = "minutely,hourly,daily,alerts";
pub const UNITS: &str = "metric";

/// Fetches current conditions for a point
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_conditions(&self, coordinates: Coordinates) -> Result<WeatherReport>;
}

#[derive(Clone)]
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    pub fn new(client: Client, config: &WeatherConfig, api_key: &str) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn onecall_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/onecall?lat={}&lon={}&exclude={}&appid={}&units={}",
            self.base_url,
            coordinates.latitude,
            coordinates.longitude,
            EXCLUDED_BLOCKS,
            urlencoding::encode(&self.api_key),
            UNITS
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn current_conditions(&self, coordinates: Coordinates) -> Result<WeatherReport> {
        let url = self.onecall_url(coordinates);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| "Failed to reach weather API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(reqwest::Error::without_url)
                .with_context(|| "Failed to read weather API error body")?;
            warn!(
                "Failed to retrieve data. Status Code: {}, Response: {}",
                status.as_u16(),
                body
            );
            return Ok(WeatherReport::Failed {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| "Failed to parse weather API response")?;
        info!(
            "Retrieved current weather for {}",
            coordinates.format_coordinates()
        );

        Ok(WeatherReport::Available(payload))
    }
}
