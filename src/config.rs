//! Configuration management for the weather assistant
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates every setting before the pipeline is built.
//! API keys have no defaults: they come from the file, from
//! `WEATHERWISE_<SECTION>__API_KEY`, or from the provider's conventional
//! variable (`OPENAI_API_KEY`, `OPENCAGE_API_KEY`, `OPENWEATHERMAP_API_KEY`).

use crate::AssistantError;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LLM_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const GEOCODING_API_KEY_VAR: &str = "OPENCAGE_API_KEY";
pub const WEATHER_API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Language model settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Geocoding provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Orchestration policy
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// HTTP service settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat-completion provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier sent with every completion request
    #[serde(default = "default_llm_model")]
    pub model: String,
}

/// Forward geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
}

/// One-call weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Compose an answer from the provider's error payload when the weather
    /// call fails. When false, the request fails with a 502 instead.
    #[serde(default = "default_compose_on_weather_failure")]
    pub compose_on_weather_failure: bool,
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// The single origin allowed to make cross-origin requests
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    /// Directory served for every path that is not an API route
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4-0613".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://api.opencagedata.com/geocode/v1".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/3.0".to_string()
}

fn default_compose_on_weather_failure() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            compose_on_weather_failure: default_compose_on_weather_failure(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            allowed_origin: default_allowed_origin(),
            static_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AssistantConfig {
    /// Load configuration from `config_path`, or from the default file location
    /// when none is given, then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let explicit = config_path.is_some();
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if explicit || config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(explicit)
                    .format(FileFormat::Toml),
            );
        }

        // WEATHERWISE_SERVER__PORT=8080 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix("WEATHERWISE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| format!("Failed to build configuration from {}", config_file.display()))?;

        let mut config: AssistantConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_secret_fallbacks(|name| std::env::var(name).ok());
        config.apply_defaults();

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherwise").join("config.toml"))
    }

    /// Fill missing API keys from the providers' conventional variables
    pub fn apply_secret_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, var: &str| {
            if slot.as_deref().is_none_or(str::is_empty) {
                *slot = lookup(var).filter(|value| !value.is_empty());
            }
        };
        fill(&mut self.llm.api_key, LLM_API_KEY_VAR);
        fill(&mut self.geocoding.api_key, GEOCODING_API_KEY_VAR);
        fill(&mut self.weather.api_key, WEATHER_API_KEY_VAR);
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_settings()?;
        Ok(())
    }

    /// Validate everything except the provider secrets
    pub fn validate_settings(&self) -> Result<()> {
        self.validate_urls()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Every provider needs a key; there is no anonymous tier for any of them
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("language model", &self.llm.api_key, LLM_API_KEY_VAR),
            ("geocoding", &self.geocoding.api_key, GEOCODING_API_KEY_VAR),
            ("weather", &self.weather.api_key, WEATHER_API_KEY_VAR),
        ];

        for (provider, key, var) in keys {
            if key.as_deref().is_none_or(str::is_empty) {
                return Err(AssistantError::config(format!(
                    "Missing {provider} API key. Set {var} or add it to the config file."
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        let urls = [
            ("LLM", &self.llm.base_url),
            ("Geocoding", &self.geocoding.base_url),
            ("Weather", &self.weather.base_url),
            ("Allowed origin", &self.server.allowed_origin),
        ];

        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AssistantError::config(format!(
                    "{name} URL must be a valid HTTP or HTTPS URL, got '{url}'"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AssistantError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AssistantError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.server.port == 0 {
            return Err(AssistantError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Fetch a validated key, or fail with a configuration error
    pub fn require_key<'a>(key: &'a Option<String>, var: &str) -> Result<&'a str> {
        key.as_deref()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AssistantError::config(format!("Missing API key, set {var}")).into())
    }
}
