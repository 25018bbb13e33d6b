use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::backend::ProgressSink;
use super::cache::ModelCache;
use super::errors::{ClassifyError, InferenceError};
use super::labels::LabelTable;
use super::scores::{Classification, label_scores};
use crate::text::NormalizedText;

/// Anything that can score normalized text against the label table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, text: NormalizedText) -> Result<Classification, ClassifyError>;
}

/// Runs inference in the calling task through the shared [`ModelCache`].
#[derive(Clone)]
pub struct Classifier {
    cache: Arc<ModelCache>,
    labels: LabelTable,
    inference_timeout: Duration,
    progress: ProgressSink,
}

impl Classifier {
    pub fn new(cache: Arc<ModelCache>, labels: LabelTable, inference_timeout: Duration) -> Self {
        Self {
            cache,
            labels,
            inference_timeout,
            progress: ProgressSink::none(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }
}

#[async_trait]
impl Classify for Classifier {
    #[instrument(skip_all, fields(chars = text.char_len()))]
    async fn classify(&self, text: NormalizedText) -> Result<Classification, ClassifyError> {
        let model = self.cache.get_or_load(&self.progress).await?;

        let logits = tokio::time::timeout(self.inference_timeout, model.logits(text.as_str()))
            .await
            .map_err(|_| InferenceError::Timeout(self.inference_timeout))??;

        let results = label_scores(&self.labels, &logits)?;
        debug!(classes = results.len(), "classified");

        Ok(Classification { results, text })
    }
}
