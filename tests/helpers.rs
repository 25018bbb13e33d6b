#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use chrono::Utc;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use adevar::{
    api,
    app_state::AppState,
    auth::JwtService,
    config::PipelineLimits,
    entities::{DatasetItem, NewDatasetItem, Role, TagStats, User},
    fetcher::Fetcher,
    inference::{Classifier, LabelTable, ModelCache, ModelSpec, RemoteModelLoader},
    middleware::rate_limit::RateLimit,
    orchestrator::Orchestrator,
    passwords::Passwords,
    repositories::{DatasetRepositoryTrait, UserRepositoryTrait},
    safety::{UnsafeUrl, UrlGuard},
};

pub const JWT_SECRET: &str = "integration-secret";
pub const MODEL_ID: &str = "test-model";

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepositoryTrait for InMemoryUsers {
    async fn create(&self, email: &str, pw_hash: &str) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            pw_hash: pw_hash.to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_password(&self, id: Uuid, new_pw_hash: &str) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.pw_hash = new_pw_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_role(&self, email: &str, role: Role) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryDataset {
    items: Mutex<Vec<DatasetItem>>,
}

impl InMemoryDataset {
    fn push(items: &mut Vec<DatasetItem>, content: &str, tag: &str, created_by: &str) -> DatasetItem {
        let now = Utc::now();
        let item = DatasetItem {
            id: items.iter().map(|i| i.id).max().unwrap_or(0) + 1,
            content: content.to_string(),
            tag: tag.to_string(),
            created_by: created_by.to_string(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        items.push(item.clone());
        item
    }
}

#[async_trait]
impl DatasetRepositoryTrait for InMemoryDataset {
    async fn insert(&self, content: &str, tag: &str, created_by: &str) -> Result<DatasetItem> {
        let mut items = self.items.lock().unwrap();
        Ok(Self::push(&mut items, content, tag, created_by))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<DatasetItem>> {
        let items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.items.lock().unwrap().len() as i64)
    }

    async fn tag_stats(&self) -> Result<Vec<TagStats>> {
        let items = self.items.lock().unwrap();
        let mut tags: Vec<String> = items.iter().map(|i| i.tag.clone()).collect();
        tags.sort();
        tags.dedup();

        Ok(tags
            .into_iter()
            .map(|tag| {
                let matching: Vec<_> = items.iter().filter(|i| i.tag == tag).collect();
                let chars: usize = matching.iter().map(|i| i.content.chars().count()).sum();
                TagStats {
                    count: matching.len() as i64,
                    avg_content_chars: chars as f64 / matching.len() as f64,
                    tag,
                }
            })
            .collect())
    }

    async fn update(
        &self,
        id: i64,
        content: &str,
        tag: &str,
        updated_by: &str,
    ) -> Result<Option<DatasetItem>> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|i| i.id == id).map(|item| {
            item.content = content.to_string();
            item.tag = tag.to_string();
            item.updated_by = Some(updated_by.to_string());
            item.updated_at = Utc::now();
            item.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn replace_all(&self, new_items: &[NewDatasetItem], created_by: &str) -> Result<u64> {
        let mut items = self.items.lock().unwrap();
        items.clear();
        for item in new_items {
            Self::push(&mut items, &item.content, &item.tag, created_by);
        }
        Ok(new_items.len() as u64)
    }
}

/// Lets every URL through so wiremock servers on 127.0.0.1 can be fetched.
pub struct AllowAll;

#[async_trait]
impl UrlGuard for AllowAll {
    async fn validate(&self, _url: &str) -> Result<(), UnsafeUrl> {
        Ok(())
    }
}

/// Router backed by in-memory repositories and a model served from `model_server`.
pub fn test_app(model_server: &MockServer, guard: Arc<dyn UrlGuard>) -> Router {
    // Never connected; only /healthz touches it.
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://postgres@127.0.0.1:1/adevar")
        .unwrap();

    let labels = LabelTable::builtin();
    let model = Arc::new(ModelCache::new(
        ModelSpec::new("text-classification", MODEL_ID),
        Arc::new(RemoteModelLoader::new(model_server.uri(), labels.len())),
        Duration::from_secs(5),
    ));
    let classifier = Classifier::new(model.clone(), labels.clone(), Duration::from_secs(5));
    let orchestrator = Orchestrator::new(
        guard,
        Fetcher::new(Duration::from_secs(5)),
        Arc::new(classifier),
        PipelineLimits::default(),
    );

    api::router(AppState {
        user_repo: Arc::new(InMemoryUsers::default()),
        dataset_repo: Arc::new(InMemoryDataset::default()),
        db_pool: pool,
        jwt: Arc::new(JwtService::new(JWT_SECRET, 1)),
        passwords: Passwords::new(1024, 1, 1).unwrap(),
        orchestrator: Arc::new(orchestrator),
        labels,
        model,
        rate_limit: RateLimit::new(1000, 60),
    })
}

/// Serves model metadata and a fixed logits row. `expected_loads` and
/// `expected_calls` are verified when the server drops.
pub async fn mount_model(
    server: &MockServer,
    logits: Value,
    expected_loads: u64,
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(format!("/models/{}", MODEL_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task": "text-classification",
            "num_labels": 5
        })))
        .expect(expected_loads)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}/logits", MODEL_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(logits))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn bearer(email: &str) -> String {
    bearer_with_role(email, Role::User)
}

pub fn admin_bearer(email: &str) -> String {
    bearer_with_role(email, Role::Admin)
}

fn bearer_with_role(email: &str, role: Role) -> String {
    let token = JwtService::new(JWT_SECRET, 1)
        .generate_token(Uuid::new_v4(), email, role)
        .unwrap();
    format!("Bearer {}", token)
}

pub fn post_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    send_json("POST", uri, auth, body)
}

pub fn put_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    send_json("PUT", uri, auth, body)
}

fn send_json(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    empty("GET", uri, auth)
}

pub fn delete(uri: &str, auth: Option<&str>) -> Request<Body> {
    empty("DELETE", uri, auth)
}

fn empty(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
