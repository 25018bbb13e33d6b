use axum::extract::FromRef;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::auth::JwtService;
use crate::inference::{LabelTable, ModelCache};
use crate::middleware::rate_limit::RateLimit;
use crate::orchestrator::Orchestrator;
use crate::passwords::Passwords;
use crate::repositories::{DatasetRepositoryTrait, UserRepositoryTrait};

#[derive(Clone)]
pub struct AppState {
    pub user_repo: Arc<dyn UserRepositoryTrait + Send + Sync>,
    pub dataset_repo: Arc<dyn DatasetRepositoryTrait + Send + Sync>,
    pub db_pool: Pool<Postgres>,
    pub jwt: Arc<JwtService>,
    pub passwords: Passwords,
    pub orchestrator: Arc<Orchestrator>,
    pub labels: LabelTable,
    pub model: Arc<ModelCache>,
    pub rate_limit: RateLimit,
}

impl FromRef<AppState> for Arc<JwtService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.jwt)
    }
}

impl FromRef<AppState> for RateLimit {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limit.clone()
    }
}
