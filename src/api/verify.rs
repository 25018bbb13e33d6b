use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyUrlRequest {
    #[serde(default)]
    pub url: String,
}

/// `message` is null when the URL is considered safe.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyUrlResponse {
    #[schema(example = json!(null))]
    pub message: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/verify-url",
    tag = "safety",
    request_body = VerifyUrlRequest,
    responses(
        (status = 200, description = "URL is safe to fetch", body = VerifyUrlResponse),
        (status = 400, description = "URL is invalid, flagged, or could not be checked", body = VerifyUrlResponse),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn verify_url(
    State(state): State<AppState>,
    Json(payload): Json<VerifyUrlRequest>,
) -> (StatusCode, Json<VerifyUrlResponse>) {
    match state.orchestrator.verify_url(&payload.url).await {
        Ok(()) => (StatusCode::OK, Json(VerifyUrlResponse { message: None })),
        Err(unsafe_url) => (
            StatusCode::BAD_REQUEST,
            Json(VerifyUrlResponse {
                message: Some(unsafe_url.to_string()),
            }),
        ),
    }
}
