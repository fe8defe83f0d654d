//! Error types and handling for the weather assistant

use std::fmt;

use thiserror::Error;

/// Field of the extracted intent that the model reply failed to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentField {
    Location,
    DataKind,
}

impl fmt::Display for IntentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentField::Location => write!(f, "location"),
            IntentField::DataKind => write!(f, "data type"),
        }
    }
}

/// Main error type for the weather assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed inbound request
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The model reply did not carry one of the required marker lines
    #[error("Could not determine {field} from model reply: {raw:?}")]
    ExtractionFailed { field: IntentField, raw: String },

    /// The geocoder returned no candidates
    #[error("Location not found: {location}")]
    LocationUnresolved { location: String },

    /// Weather provider answered with a non-success status and the pipeline
    /// is configured to fail fast
    #[error("Weather provider returned status {status}: {body}")]
    WeatherUnavailable { status: u16, body: String },

    /// Anything else: network faults, JSON faults, provider errors
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AssistantError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new extraction error for the missing field
    pub fn extraction_failed<S: Into<String>>(field: IntentField, raw: S) -> Self {
        Self::ExtractionFailed {
            field,
            raw: raw.into(),
        }
    }

    /// Create a new unresolved location error
    pub fn location_unresolved<S: Into<String>>(location: S) -> Self {
        Self::LocationUnresolved {
            location: location.into(),
        }
    }

    /// True for failures caused by the caller's input rather than by the service
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AssistantError::InvalidRequest { .. }
                | AssistantError::ExtractionFailed { .. }
                | AssistantError::LocationUnresolved { .. }
        )
    }

    /// Get the message shown to callers. Internal details never leak here.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            AssistantError::InvalidRequest { .. } => "Invalid request data",
            AssistantError::ExtractionFailed {
                field: IntentField::Location,
                ..
            } => "Could not determine location from LLM response.",
            AssistantError::ExtractionFailed {
                field: IntentField::DataKind,
                ..
            } => "Could not determine data type from LLM response.",
            AssistantError::LocationUnresolved { .. } => {
                "Could not retrieve weather data for the specified input."
            }
            AssistantError::WeatherUnavailable { .. } => "Weather provider request failed.",
            AssistantError::Config { .. } | AssistantError::Internal(_) => "Internal Server Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = AssistantError::config("missing API key");
        assert!(matches!(config_err, AssistantError::Config { .. }));

        let request_err = AssistantError::invalid_request("no question");
        assert!(matches!(request_err, AssistantError::InvalidRequest { .. }));

        let unresolved = AssistantError::location_unresolved("Atlantis");
        assert!(matches!(unresolved, AssistantError::LocationUnresolved { .. }));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AssistantError::invalid_request("x").user_message(),
            "Invalid request data"
        );
        assert_eq!(
            AssistantError::extraction_failed(IntentField::Location, "hello").user_message(),
            "Could not determine location from LLM response."
        );
        assert_eq!(
            AssistantError::extraction_failed(IntentField::DataKind, "hello").user_message(),
            "Could not determine data type from LLM response."
        );
        assert_eq!(
            AssistantError::location_unresolved("Atlantis").user_message(),
            "Could not retrieve weather data for the specified input."
        );
    }

    #[test]
    fn test_internal_message_is_opaque() {
        let err: AssistantError = anyhow::anyhow!("secret key sk-123 rejected").into();
        assert_eq!(err.user_message(), "Internal Server Error");
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("sk-123"));
    }

    #[test]
    fn test_client_errors() {
        assert!(AssistantError::invalid_request("x").is_client_error());
        assert!(AssistantError::location_unresolved("x").is_client_error());
        assert!(!AssistantError::config("x").is_client_error());
        assert!(
            !AssistantError::WeatherUnavailable {
                status: 404,
                body: String::new()
            }
            .is_client_error()
        );
    }
}
