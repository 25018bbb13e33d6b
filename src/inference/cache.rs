//! Process-wide model cache.
//!
//! The first caller triggers the load; concurrent callers wait on the same
//! attempt. A failed attempt leaves the cache empty so a later call retries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;
use tracing::{error, info};

use super::backend::{LoadEvent, ModelLoader, ModelSpec, ProgressSink, TextClassifier};
use super::errors::ModelLoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Uninitialized,
    Loading,
    Ready,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
        }
    }
}

pub struct ModelCache {
    spec: ModelSpec,
    loader: Arc<dyn ModelLoader>,
    load_timeout: Duration,
    cell: OnceCell<Arc<dyn TextClassifier>>,
    loading: AtomicBool,
}

/// Clears the loading flag even if the load future is dropped mid-way.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ModelCache {
    pub fn new(spec: ModelSpec, loader: Arc<dyn ModelLoader>, load_timeout: Duration) -> Self {
        Self {
            spec,
            loader,
            load_timeout,
            cell: OnceCell::new(),
            loading: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ModelState {
        if self.cell.initialized() {
            ModelState::Ready
        } else if self.loading.load(Ordering::Acquire) {
            ModelState::Loading
        } else {
            ModelState::Uninitialized
        }
    }

    /// Returns the loaded model, loading it first if needed.
    pub async fn get_or_load(
        &self,
        progress: &ProgressSink,
    ) -> Result<Arc<dyn TextClassifier>, ModelLoadError> {
        let handle = self.cell.get_or_try_init(|| self.load(progress)).await?;
        Ok(Arc::clone(handle))
    }

    async fn load(&self, progress: &ProgressSink) -> Result<Arc<dyn TextClassifier>, ModelLoadError> {
        self.loading.store(true, Ordering::Release);
        let _guard = LoadingGuard(&self.loading);
        let model = self.spec.model_id.clone();

        info!(model = %self.spec, "loading model");
        progress.emit(LoadEvent::Initiate {
            model: model.clone(),
        });

        let started = Instant::now();
        let result = tokio::time::timeout(self.load_timeout, self.loader.load(&self.spec, progress))
            .await
            .unwrap_or(Err(ModelLoadError::Timeout(self.load_timeout)));

        match &result {
            Ok(_) => {
                info!(
                    model = %self.spec,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "model ready"
                );
                progress.emit(LoadEvent::Ready { model });
            }
            Err(e) => {
                error!(model = %self.spec, error = %e, "model load failed");
                progress.emit(LoadEvent::Failed {
                    model,
                    error: e.to_string(),
                });
            }
        }

        result
    }
}
