use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::AssistantError;
use crate::pipeline::{TracingSink, WeatherPipeline};

#[derive(Debug, Serialize, Deserialize)]
pub struct WeatherQuestion {
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeatherAnswer {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Pipeline failure rendered as `{"error": ...}` with a matching status
pub struct ApiError(pub AssistantError);

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AssistantError::InvalidRequest { .. }
            | AssistantError::ExtractionFailed { .. }
            | AssistantError::LocationUnresolved { .. } => StatusCode::BAD_REQUEST,
            AssistantError::WeatherUnavailable { .. } => StatusCode::BAD_GATEWAY,
            AssistantError::Config { .. } | AssistantError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("An error occurred: {:?}", self.0);
        } else {
            warn!("Rejected weather question: {}", self.0);
        }
        (status, Json(ErrorBody::new(self.0.user_message()))).into_response()
    }
}

pub fn router(pipeline: Arc<WeatherPipeline>) -> Router {
    Router::new()
        .route("/weather", post(ask_weather))
        .with_state(pipeline)
}

async fn ask_weather(
    State(pipeline): State<Arc<WeatherPipeline>>,
    payload: Result<Json<WeatherQuestion>, JsonRejection>,
) -> Result<Json<WeatherAnswer>, ApiError> {
    let question = match payload {
        Ok(Json(WeatherQuestion {
            question: Some(question),
        })) => question,
        Ok(Json(WeatherQuestion { question: None })) => {
            return Err(AssistantError::invalid_request("missing 'question' field").into());
        }
        Err(rejection) => {
            return Err(AssistantError::invalid_request(rejection.body_text()).into());
        }
    };

    let answer = pipeline.answer(&question, &mut TracingSink).await?;
    Ok(Json(WeatherAnswer { response: answer }))
}
