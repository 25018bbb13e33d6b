use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::errors::{ApiError, ErrorResponse},
    app_state::AppState,
    auth::AuthenticatedUser,
    inference::{ClassScore, Classification},
    orchestrator::ClassifyRequest,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyTextRequest {
    #[serde(default)]
    #[schema(example = "Aceasta este o știre complet falsă despre alegeri.")]
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyUrlRequest {
    #[serde(default)]
    #[schema(example = "https://www.example.ro/stiri/articol")]
    pub url: String,
}

/// Scores in label table order, plus the normalized text that was classified.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClassifyResponse {
    pub results: Vec<ClassScore>,
    pub text: String,
}

impl From<Classification> for ClassifyResponse {
    fn from(classification: Classification) -> Self {
        Self {
            results: classification.results,
            text: classification.text.into_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/classify/text",
    tag = "classify",
    request_body = ClassifyTextRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Class probabilities", body = ClassifyResponse),
        (status = 400, description = "Missing text", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 503, description = "Model could not be loaded", body = ErrorResponse),
        (status = 504, description = "Model load or inference timed out", body = ErrorResponse)
    )
)]
pub async fn classify_text(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<ClassifyTextRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let classification = state
        .orchestrator
        .run(ClassifyRequest::Text(payload.text))
        .await?;
    Ok(Json(classification.into()))
}

#[utoipa::path(
    post,
    path = "/v1/classify/url",
    tag = "classify",
    request_body = ClassifyUrlRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Class probabilities for the extracted article", body = ClassifyResponse),
        (status = 400, description = "Missing, unsafe, or unreachable URL, or too little article text", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 503, description = "Model could not be loaded", body = ErrorResponse),
        (status = 504, description = "Model load or inference timed out", body = ErrorResponse)
    )
)]
pub async fn classify_url(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<ClassifyUrlRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let classification = state
        .orchestrator
        .run(ClassifyRequest::Url(payload.url))
        .await?;
    Ok(Json(classification.into()))
}
