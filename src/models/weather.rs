//! Weather provider result

use serde_json::{Value, json};

/// Outcome of a one-call weather request.
///
/// The payload is opaque: it is never validated against the provider's schema,
/// only handed to the composer as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReport {
    /// The provider answered with a success status
    Available(Value),
    /// The provider answered with a non-success status
    Failed { status: u16, body: String },
}

impl WeatherReport {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, WeatherReport::Available(_))
    }

    /// The document handed to the composer. Failures become an error-shaped
    /// object carrying the status code and the raw response text.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        match self {
            WeatherReport::Available(payload) => payload.clone(),
            WeatherReport::Failed { status, body } => json!({
                "error": format!("Failed to retrieve data. Status Code: {status}, Response: {body}")
            }),
        }
    }

    /// Compact JSON rendering of [`Self::to_payload`]
    #[must_use]
    pub fn to_compact_json(&self) -> String {
        self.to_payload().to_string()
    }
}
