//! Intent extraction: the first language-model step

use anyhow::Result;
use tracing::instrument;

use crate::llm::ChatClient;
use crate::models::ParsedIntent;

pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a weather assistant. Your task is to determine the location and type of weather data needed based on the user's question. \
Please respond with the following format:\n\
Location: <location_name>\n\
Type of Weather Data: <data_type>\n\
If the location is unspecified, <location_name> is 'None'. \
If the type of weather data is unspecified, <data_type> is 'All data'.";

/// Reply of the extraction step together with its parse
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The model's reply, verbatim
    pub reply: String,
    pub intent: ParsedIntent,
}

/// Ask the model which place and weather attribute the question is about
#[instrument(skip(chat))]
pub async fn extract_intent(chat: &dyn ChatClient, question: &str) -> Result<Extraction> {
    let reply = chat.complete(EXTRACTION_SYSTEM_PROMPT, question).await?;

    let intent = ParsedIntent::parse(&reply);
    Ok(Extraction { reply, intent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Intent;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoPrompt {
        seen: Mutex<Vec<(String, String)>>,
        reply: &'static str,
    }

    #[async_trait]
    impl ChatClient for EchoPrompt {
        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn test_extract_intent_sends_question_as_user_turn() {
        let chat = EchoPrompt {
            seen: Mutex::new(Vec::new()),
            reply: "Location: Boston\nType of Weather Data: sky conditions",
        };

        let extraction = extract_intent(&chat, "Will it be sunny in Boston tomorrow?")
            .await
            .unwrap();

        assert_eq!(
            extraction.intent,
            ParsedIntent::Parsed(Intent::new("Boston", "sky conditions"))
        );
        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, EXTRACTION_SYSTEM_PROMPT);
        assert_eq!(seen[0].1, "Will it be sunny in Boston tomorrow?");
    }

    #[test]
    fn test_prompt_describes_both_markers() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("Location: <location_name>"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("Type of Weather Data: <data_type>"));
    }
}
