//! Intent model and the grammar of the extraction reply
//!
//! The model is asked to answer with exactly two lines:
//!
//! ```text
//! Location: <location_name>
//! Type of Weather Data: <data_type>
//! ```
//!
//! Each value is the text after the last colon of the first line carrying its
//! marker, so `Location: New York: Manhattan` resolves to `Manhattan`.

use serde::{Deserialize, Serialize};

use crate::error::IntentField;

pub const LOCATION_MARKER: &str = "Location:";
pub const DATA_KIND_MARKER: &str = "Type of Weather Data:";

/// Value the model uses when the question names no place
pub const UNSPECIFIED_LOCATION: &str = "None";

/// Location and requested weather attribute of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub location: String,
    pub data_kind: String,
}

impl Intent {
    pub fn new(location: impl Into<String>, data_kind: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            data_kind: data_kind.into(),
        }
    }

    /// True when the model reported that the question names no place
    #[must_use]
    pub fn location_is_unspecified(&self) -> bool {
        self.location.is_empty() || self.location.eq_ignore_ascii_case(UNSPECIFIED_LOCATION)
    }
}

/// Result of parsing an extraction reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedIntent {
    Parsed(Intent),
    /// A marker line is missing; `missing` is the first absent field
    Malformed { raw: String, missing: IntentField },
}

impl ParsedIntent {
    /// Parse the model's free-text reply
    #[must_use]
    pub fn parse(reply: &str) -> Self {
        let location = marker_value(reply, LOCATION_MARKER);
        let data_kind = marker_value(reply, DATA_KIND_MARKER);

        match (location, data_kind) {
            (Some(location), Some(data_kind)) => ParsedIntent::Parsed(Intent {
                location,
                data_kind,
            }),
            (None, _) => ParsedIntent::Malformed {
                raw: reply.to_string(),
                missing: IntentField::Location,
            },
            (Some(_), None) => ParsedIntent::Malformed {
                raw: reply.to_string(),
                missing: IntentField::DataKind,
            },
        }
    }
}

fn marker_value(reply: &str, marker: &str) -> Option<String> {
    reply
        .lines()
        .find(|line| line.contains(marker))
        .map(after_last_colon)
}

fn after_last_colon(line: &str) -> String {
    line.rsplit_once(':')
        .map_or(line, |(_, tail)| tail)
        .trim()
        .to_string()
}
