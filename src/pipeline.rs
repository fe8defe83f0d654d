//! Question answering pipeline
//!
//! Runs the four steps strictly in sequence:
//! intent extraction → geocoding → weather fetch → composition.
//! Both entry points (HTTP service and one-shot CLI) drive the same
//! [`WeatherPipeline::answer`]; what they do with intermediate results is up to
//! the [`PipelineSink`] they pass in.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::composer::compose_answer;
use crate::config::{
    AssistantConfig, GEOCODING_API_KEY_VAR, LLM_API_KEY_VAR, WEATHER_API_KEY_VAR,
};
use crate::error::AssistantError;
use crate::geocode::{Geocoder, OpenCageGeocoder};
use crate::intent::extract_intent;
use crate::llm::{ChatClient, OpenAiChatClient};
use crate::models::{Coordinates, Intent, ParsedIntent, WeatherReport};
use crate::weather::{OpenWeatherMapClient, WeatherProvider};

/// Answer given when the model reports that the question names no place
pub const MISSING_LOCATION_ANSWER: &str =
    "Please enter a location so that I can answer your question!";

const USER_AGENT: &str = concat!("weatherwise/", env!("CARGO_PKG_VERSION"));

/// Where a request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracting,
    Extracted,
    ExtractionFailed,
    /// The question names no place; the user is asked for one
    LocationMissing,
    Geocoding,
    Geocoded,
    Unresolved,
    FetchingWeather,
    WeatherFetched,
    Composing,
    Composed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Extracting => "extracting",
            Stage::Extracted => "extracted",
            Stage::ExtractionFailed => "extraction_failed",
            Stage::LocationMissing => "location_missing",
            Stage::Geocoding => "geocoding",
            Stage::Geocoded => "geocoded",
            Stage::Unresolved => "unresolved",
            Stage::FetchingWeather => "fetching_weather",
            Stage::WeatherFetched => "weather_fetched",
            Stage::Composing => "composing",
            Stage::Composed => "composed",
        };
        f.write_str(name)
    }
}

/// Intermediate results handed to a sink as they are produced
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    Interpreted(&'a str),
    Extracted(&'a Intent),
    Geocoded(Coordinates),
    WeatherFetched(&'a WeatherReport),
    Answered(&'a str),
}

/// Receives stage transitions and intermediate results of one run
pub trait PipelineSink: Send {
    fn stage(&mut self, _stage: Stage) {}

    fn event(&mut self, event: PipelineEvent<'_>);
}

/// Sink for the HTTP service: everything goes to the log
#[derive(Debug, Default)]
pub struct TracingSink;

impl PipelineSink for TracingSink {
    fn stage(&mut self, stage: Stage) {
        debug!(%stage, "Pipeline stage");
    }

    fn event(&mut self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::Interpreted(reply) => debug!("LLM Interpretation: {}", reply),
            PipelineEvent::Extracted(intent) => info!(
                location = %intent.location,
                kind = %intent.data_kind,
                "Extracted intent"
            ),
            PipelineEvent::Geocoded(coordinates) => {
                info!("Resolved coordinates {}", coordinates.format_coordinates())
            }
            PipelineEvent::WeatherFetched(report) => {
                debug!(available = report.is_available(), "Weather report received")
            }
            PipelineEvent::Answered(answer) => debug!("Composed answer: {}", answer),
        }
    }
}

/// Sink for the one-shot variant: prints intermediate and final results
pub struct ConsoleSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print a message that ends the run without an answer
    pub fn report_failure(&mut self, error: &AssistantError) {
        let message = match error {
            AssistantError::Config { message } => message.as_str(),
            other => other.user_message(),
        };
        self.print(format_args!("{message}"));
    }

    fn print(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("Failed to write pipeline output: {}", e);
        }
    }
}

impl<W: Write + Send> PipelineSink for ConsoleSink<W> {
    fn event(&mut self, event: PipelineEvent<'_>) {
        match event {
            PipelineEvent::Interpreted(reply) => {
                self.print(format_args!("LLM Interpretation: {reply}"))
            }
            PipelineEvent::Extracted(intent) => self.print(format_args!(
                "Location: {} | Weather data: {}",
                intent.location, intent.data_kind
            )),
            PipelineEvent::Geocoded(coordinates) => self.print(format_args!(
                "Coordinates: {}",
                coordinates.format_coordinates()
            )),
            PipelineEvent::WeatherFetched(WeatherReport::Failed { status, body }) => self.print(
                format_args!("Failed to retrieve data. Status Code: {status}, Response: {body}"),
            ),
            PipelineEvent::WeatherFetched(WeatherReport::Available(_)) => {}
            PipelineEvent::Answered(answer) => self.print(format_args!("{answer}")),
        }
    }
}

/// Orchestration policy
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Compose an answer from the error payload when the weather call fails
    pub compose_on_weather_failure: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            compose_on_weather_failure: true,
        }
    }
}

/// The three collaborators plus the policy that sequences them
#[derive(Clone)]
pub struct WeatherPipeline {
    chat: Arc<dyn ChatClient>,
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
    options: PipelineOptions,
}

impl WeatherPipeline {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherProvider>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            chat,
            geocoder,
            weather,
            options,
        }
    }

    /// Build the production collaborators, sharing one HTTP client
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let llm_key = AssistantConfig::require_key(&config.llm.api_key, LLM_API_KEY_VAR)?;
        let geocoding_key =
            AssistantConfig::require_key(&config.geocoding.api_key, GEOCODING_API_KEY_VAR)?;
        let weather_key =
            AssistantConfig::require_key(&config.weather.api_key, WEATHER_API_KEY_VAR)?;

        Ok(Self::new(
            Arc::new(OpenAiChatClient::new(client.clone(), &config.llm, llm_key)),
            Arc::new(OpenCageGeocoder::new(
                client.clone(),
                &config.geocoding,
                geocoding_key,
            )),
            Arc::new(OpenWeatherMapClient::new(client, &config.weather, weather_key)),
            PipelineOptions {
                compose_on_weather_failure: config.pipeline.compose_on_weather_failure,
            },
        ))
    }

    /// Answer one question
    #[instrument(skip(self, sink))]
    pub async fn answer<S: PipelineSink + ?Sized>(
        &self,
        question: &str,
        sink: &mut S,
    ) -> Result<String, AssistantError> {
        sink.stage(Stage::Received);

        sink.stage(Stage::Extracting);
        let extraction = extract_intent(self.chat.as_ref(), question).await?;
        sink.event(PipelineEvent::Interpreted(&extraction.reply));

        let intent = match extraction.intent {
            ParsedIntent::Parsed(intent) => intent,
            ParsedIntent::Malformed { raw, missing } => {
                sink.stage(Stage::ExtractionFailed);
                warn!("Could not determine {} from LLM response", missing);
                return Err(AssistantError::extraction_failed(missing, raw));
            }
        };
        sink.stage(Stage::Extracted);
        sink.event(PipelineEvent::Extracted(&intent));

        if intent.location_is_unspecified() {
            info!("Question names no location, asking the user for one");
            sink.stage(Stage::LocationMissing);
            sink.event(PipelineEvent::Answered(MISSING_LOCATION_ANSWER));
            return Ok(MISSING_LOCATION_ANSWER.to_string());
        }

        sink.stage(Stage::Geocoding);
        let Some(coordinates) = self.geocoder.geocode(&intent.location).await? else {
            sink.stage(Stage::Unresolved);
            return Err(AssistantError::location_unresolved(intent.location));
        };
        sink.stage(Stage::Geocoded);
        sink.event(PipelineEvent::Geocoded(coordinates));

        sink.stage(Stage::FetchingWeather);
        let report = self.weather.current_conditions(coordinates).await?;
        sink.stage(Stage::WeatherFetched);
        sink.event(PipelineEvent::WeatherFetched(&report));

        if let WeatherReport::Failed { status, body } = &report {
            if !self.options.compose_on_weather_failure {
                return Err(AssistantError::WeatherUnavailable {
                    status: *status,
                    body: body.clone(),
                });
            }
            warn!(
                status,
                "Weather provider failed, composing from its error payload"
            );
        }

        sink.stage(Stage::Composing);
        let answer = compose_answer(self.chat.as_ref(), &intent, &report).await?;
        sink.stage(Stage::Composed);
        sink.event(PipelineEvent::Answered(&answer));

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_console_sink_prints_interpretation_and_answer() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.event(PipelineEvent::Interpreted("Location: Boston"));
        sink.event(PipelineEvent::Geocoded(Coordinates::new(42.36, -71.06)));
        sink.event(PipelineEvent::WeatherFetched(&WeatherReport::Available(
            json!({}),
        )));
        sink.event(PipelineEvent::Answered("Sunny. Wear a hat."));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "LLM Interpretation: Location: Boston\nCoordinates: 42.3600, -71.0600\nSunny. Wear a hat.\n"
        );
    }

    #[test]
    fn test_console_sink_reports_failures_with_user_message() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.report_failure(&AssistantError::location_unresolved("Atlantis"));
        sink.report_failure(&AssistantError::config("Missing weather API key"));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "Could not retrieve weather data for the specified input.\nMissing weather API key\n"
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::FetchingWeather.to_string(), "fetching_weather");
        assert_eq!(Stage::ExtractionFailed.to_string(), "extraction_failed");
        assert_eq!(Stage::LocationMissing.to_string(), "location_missing");
    }
}
