use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::errors::{InferenceError, ModelLoadError};

/// Identifies the model to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub task: String,
    pub model_id: String,
}

impl ModelSpec {
    pub fn new(task: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            model_id: model_id.into(),
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.task, self.model_id)
    }
}

/// Load lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Initiate { model: String },
    Progress { model: String, message: String },
    Ready { model: String },
    Failed { model: String, error: String },
}

type ProgressFn = dyn Fn(LoadEvent) + Send + Sync;

/// Optional receiver for [`LoadEvent`]s. The default sink drops everything.
#[derive(Clone, Default)]
pub struct ProgressSink(Option<Arc<ProgressFn>>);

impl ProgressSink {
    pub fn new(callback: impl Fn(LoadEvent) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(callback)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: LoadEvent) {
        if let Some(callback) = &self.0 {
            callback(event);
        }
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProgressSink")
            .field(&self.0.as_ref().map(|_| "callback"))
            .finish()
    }
}

/// A loaded model. Returns one raw logit per class for a single input.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn logits(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

/// Produces a ready [`TextClassifier`]. Called at most once per successful load.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(
        &self,
        spec: &ModelSpec,
        progress: &ProgressSink,
    ) -> Result<Arc<dyn TextClassifier>, ModelLoadError>;
}
