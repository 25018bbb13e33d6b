use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::JwtService;
use crate::config::PipelineLimits;
use crate::entities::Role;
use crate::fetcher::Fetcher;
use crate::inference::{Classifier, LabelTable, ModelCache, ModelSpec, RemoteModelLoader};
use crate::middleware::rate_limit::RateLimit;
use crate::orchestrator::Orchestrator;
use crate::passwords::Passwords;
use crate::repositories::dataset::MockDatasetRepositoryTrait;
use crate::repositories::user::MockUserRepositoryTrait;
use crate::safety::MockUrlGuard;

pub const TEST_JWT_SECRET: &str = "test-secret";

/// State with mocks that panic on any unexpected call. Tests replace the
/// pieces they exercise. Must be called inside a tokio runtime.
pub fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://postgres@127.0.0.1:1/adevar")
        .expect("lazy pool");

    let labels = LabelTable::builtin();
    let model = Arc::new(ModelCache::new(
        ModelSpec::new("text-classification", "test/model"),
        Arc::new(RemoteModelLoader::new("http://127.0.0.1:1", labels.len())),
        Duration::from_millis(250),
    ));
    let classifier = Classifier::new(model.clone(), labels.clone(), Duration::from_secs(1));
    let orchestrator = Orchestrator::new(
        Arc::new(MockUrlGuard::new()),
        Fetcher::new(Duration::from_secs(1)),
        Arc::new(classifier),
        PipelineLimits::default(),
    );

    AppState {
        user_repo: Arc::new(MockUserRepositoryTrait::new()),
        dataset_repo: Arc::new(MockDatasetRepositoryTrait::new()),
        db_pool: pool,
        jwt: Arc::new(JwtService::new(TEST_JWT_SECRET, 24)),
        passwords: Passwords::new(1024, 1, 1).expect("argon2 params"),
        orchestrator: Arc::new(orchestrator),
        labels,
        model,
        rate_limit: RateLimit::new(1000, 60),
    }
}

/// `Authorization` header value for a fresh user with `email`.
pub fn bearer(email: &str) -> String {
    bearer_with_role(email, Role::User)
}

pub fn admin_bearer(email: &str) -> String {
    bearer_with_role(email, Role::Admin)
}

fn bearer_with_role(email: &str, role: Role) -> String {
    let token = JwtService::new(TEST_JWT_SECRET, 24)
        .generate_token(Uuid::new_v4(), email, role)
        .expect("token");
    format!("Bearer {}", token)
}
