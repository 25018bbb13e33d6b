//! HTTP mapping for every failure a handler can surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::inference::{ClassifyError, InferenceError};
use crate::orchestrator::{MissingField, PipelineError};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Missing text parameter")]
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Pipeline(err) => pipeline_status(err),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

fn pipeline_status(err: &PipelineError) -> (StatusCode, String) {
    let bad_request = |msg: &str| (StatusCode::BAD_REQUEST, msg.to_string());

    match err {
        PipelineError::Missing(MissingField::Text) => bad_request("Missing text parameter"),
        PipelineError::Missing(MissingField::Url) => bad_request("Missing url parameter"),
        PipelineError::NothingToClassify => bad_request("Text contains no words to classify"),
        PipelineError::UnsafeUrl(unsafe_url) => (StatusCode::BAD_REQUEST, unsafe_url.to_string()),
        PipelineError::Fetch(_) => bad_request("Error fetching the URL"),
        PipelineError::ContentTooShort { .. } => bad_request("Article content too short"),
        PipelineError::Classify(err) if err.is_timeout() => (
            StatusCode::GATEWAY_TIMEOUT,
            "Classification timed out".to_string(),
        ),
        PipelineError::Classify(ClassifyError::Load(_))
        | PipelineError::Classify(ClassifyError::Inference(InferenceError::WorkerUnavailable)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Model is not available".to_string(),
        ),
        PipelineError::Classify(ClassifyError::Inference(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Classification failed".to_string(),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        } else {
            warn!(error = %self, %status, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
