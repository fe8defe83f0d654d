//! Chat-completion client
//!
//! Both language-model steps of the pipeline send one `system` turn and one
//! `user` turn and read back the first choice's text. [`ChatClient`] is the seam
//! the pipeline depends on; [`OpenAiChatClient`] talks to any endpoint that
//! speaks the OpenAI `chat/completions` protocol.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::LlmConfig;

/// Sends a system instruction plus a user prompt and returns the reply text
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat client
#[derive(Clone)]
pub struct OpenAiChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(client: Client, config: &LlmConfig, api_key: &str) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to reach chat completion endpoint {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Chat completion API error {status}: {error_text}");
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| "Failed to parse chat completion response")?;
        debug!("Received {} completion choice(s)", completion.choices.len());

        completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Invalid response from chat completion API: no choices"))?
            .message
            .content
            .ok_or_else(|| anyhow!("Invalid response from chat completion API: empty message"))
    }
}
