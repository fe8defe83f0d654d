//! Data models for the weather assistant
//!
//! Every value here is request scoped and created by exactly one pipeline step:
//! - Intent: location and requested weather attribute extracted from a question
//! - Location: coordinates produced by the geocoder
//! - Weather: the provider's payload, or the failure it reported

pub mod intent;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use intent::{Intent, ParsedIntent};
pub use location::Coordinates;
pub use weather::WeatherReport;
