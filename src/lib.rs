//! `Weatherwise` - natural-language weather questions
//!
//! This library chains a language model, a forward geocoder and a one-call
//! weather provider to answer free-text questions such as
//! "Will it be sunny in Boston tomorrow?".

pub mod api;
pub mod composer;
pub mod config;
pub mod error;
pub mod geocode;
pub mod intent;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use crate::config::AssistantConfig;
pub use error::{AssistantError, IntentField};
pub use geocode::{Geocoder, OpenCageGeocoder};
pub use llm::{ChatClient, OpenAiChatClient};
pub use models::{Coordinates, Intent, ParsedIntent, WeatherReport};
pub use pipeline::{
    ConsoleSink, PipelineEvent, PipelineOptions, PipelineSink, Stage, TracingSink,
    WeatherPipeline,
};
pub use weather::{OpenWeatherMapClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
