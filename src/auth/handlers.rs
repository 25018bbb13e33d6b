use axum::{Json, extract::State, http::StatusCode};
use tracing::{info, warn};

use crate::{
    api::errors::{ApiError, ErrorResponse},
    app_state::AppState,
    auth::dtos::{LoginRequest, LoginResponse, RegisterRequest},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid email or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    if state.user_repo.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let pw_hash = state
        .passwords
        .hash(&payload.password)
        .map_err(|e| ApiError::Internal(e.into()))?;

    let user = state.user_repo.create(&payload.email, &pw_hash).await?;
    info!(user_id = %user.id, "user registered");

    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = LoginResponse),
        (status = 400, description = "Malformed credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let user = state
        .user_repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let (is_valid, needs_rehash) = state
        .passwords
        .verify(&payload.password, &user.pw_hash)
        .map_err(|e| ApiError::Internal(e.into()))?;

    if !is_valid {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if needs_rehash {
        let rehashed = state
            .passwords
            .hash(&payload.password)
            .map_err(|e| ApiError::Internal(e.into()))?;
        if let Err(e) = state.user_repo.update_password(user.id, &rehashed).await {
            warn!(user_id = %user.id, error = %e, "failed to upgrade password hash");
        }
    }

    let token = state.jwt.generate_token(user.id, &user.email, user.role)?;

    Ok(Json(LoginResponse { token }))
}
