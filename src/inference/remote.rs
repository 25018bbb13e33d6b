//! Model backend served over HTTP.
//!
//! `GET {base}/models/{model_id}` confirms the model is available and
//! reports its shape. `POST {base}/models/{model_id}/logits` with
//! `{"inputs": text}` returns raw logits, either flat or as a single row.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::backend::{LoadEvent, ModelLoader, ModelSpec, ProgressSink, TextClassifier};
use super::errors::{InferenceError, ModelLoadError};
use crate::fetcher::shared_client;

#[derive(Debug, Deserialize)]
struct ModelInfo {
    #[serde(default)]
    task: Option<String>,
    #[serde(default)]
    num_labels: Option<usize>,
}

#[derive(Serialize)]
struct LogitsRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LogitsBody {
    Flat(Vec<f32>),
    Batched(Vec<Vec<f32>>),
    Wrapped { logits: Vec<f32> },
}

impl LogitsBody {
    fn into_row(self) -> Result<Vec<f32>, InferenceError> {
        match self {
            Self::Flat(row) | Self::Wrapped { logits: row } => Ok(row),
            Self::Batched(mut rows) if rows.len() == 1 => Ok(rows.remove(0)),
            Self::Batched(rows) => Err(InferenceError::Decode(format!(
                "expected one row of logits, got {}",
                rows.len()
            ))),
        }
    }
}

/// Loads models from an inference server.
#[derive(Debug, Clone)]
pub struct RemoteModelLoader {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    expected_labels: usize,
}

impl RemoteModelLoader {
    pub fn new(base_url: impl Into<String>, expected_labels: usize) -> Self {
        Self {
            client: shared_client().clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            expected_labels,
        }
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }
}

#[async_trait]
impl ModelLoader for RemoteModelLoader {
    #[instrument(skip(self, progress), fields(model = %spec))]
    async fn load(
        &self,
        spec: &ModelSpec,
        progress: &ProgressSink,
    ) -> Result<Arc<dyn TextClassifier>, ModelLoadError> {
        let model_url = format!("{}/models/{}", self.base_url, spec.model_id);

        let response = authorize(self.client.get(&model_url), self.api_token.as_deref())
            .send()
            .await
            .map_err(|e| ModelLoadError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelLoadError::Http { status });
        }

        let info: ModelInfo = response
            .json()
            .await
            .map_err(|e| ModelLoadError::InvalidMetadata(e.to_string()))?;

        progress.emit(LoadEvent::Progress {
            model: spec.model_id.clone(),
            message: "metadata received".to_string(),
        });

        if let Some(task) = info.task.as_deref().filter(|t| *t != spec.task) {
            warn!(served = task, requested = %spec.task, "model task differs from configured task");
        }

        if let Some(num_labels) = info.num_labels {
            if num_labels != self.expected_labels {
                return Err(ModelLoadError::LabelMismatch {
                    model: num_labels,
                    table: self.expected_labels,
                });
            }
        }

        info!(num_labels = ?info.num_labels, "remote model available");

        Ok(Arc::new(RemoteClassifier {
            client: self.client.clone(),
            endpoint: format!("{}/logits", model_url),
            api_token: self.api_token.clone(),
        }))
    }
}

/// Handle to a model hosted by the inference server.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

#[async_trait]
impl TextClassifier for RemoteClassifier {
    async fn logits(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let response = authorize(self.client.post(&self.endpoint), self.api_token.as_deref())
            .json(&LogitsRequest { inputs: text })
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::Http { status });
        }

        let body: LogitsBody = response
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        let row = body.into_row()?;
        debug!(outputs = row.len(), "received logits");
        Ok(row)
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}
