//! Response composition: the second language-model step

use anyhow::Result;
use tracing::instrument;

use crate::llm::ChatClient;
use crate::models::{Intent, WeatherReport};

pub const COMPOSER_SYSTEM_PROMPT: &str = "You are a weather assistant. Respond in natural language. \
You are friendly but professional. Focus on the facts. \
Do not include any other information than is required to answer the question. \
At the end of your response, include how a person might want to dress for the day based on the weather.";

/// User turn embedding the weather payload verbatim as compact JSON
#[must_use]
pub fn composer_prompt(intent: &Intent, report: &WeatherReport) -> String {
    format!(
        "Based on the following data, answer the user's question about {} in {} specifically and concisely: {}",
        intent.data_kind,
        intent.location,
        report.to_compact_json()
    )
}

/// Phrase the weather data as an answer. The reply is returned as-is.
#[instrument(skip(chat, report), fields(location = %intent.location, kind = %intent.data_kind))]
pub async fn compose_answer(
    chat: &dyn ChatClient,
    intent: &Intent,
    report: &WeatherReport,
) -> Result<String> {
    chat.complete(COMPOSER_SYSTEM_PROMPT, &composer_prompt(intent, report))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_embeds_kind_location_and_payload() {
        let intent = Intent::new("Boston", "temperature");
        let report = WeatherReport::Available(json!({"current": {"temp": 3.5}}));

        assert_eq!(
            composer_prompt(&intent, &report),
            r#"Based on the following data, answer the user's question about temperature in Boston specifically and concisely: {"current":{"temp":3.5}}"#
        );
    }

    #[test]
    fn test_prompt_embeds_error_payload_for_failed_report() {
        let intent = Intent::new("Boston", "rain");
        let report = WeatherReport::Failed {
            status: 404,
            body: "not found".to_string(),
        };

        let prompt = composer_prompt(&intent, &report);
        assert!(prompt.ends_with(
            r#"{"error":"Failed to retrieve data. Status Code: 404, Response: not found"}"#
        ));
    }

    #[test]
    fn test_persona_ends_with_clothing_advice() {
        assert!(COMPOSER_SYSTEM_PROMPT.contains("how a person might want to dress"));
    }
}
