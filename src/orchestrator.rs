//! One entry point for both request kinds.
//!
//! Stages run strictly in order and the first failure short-circuits the
//! rest: validate, fetch, extract, length gate, normalize, classify.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::PipelineLimits;
use crate::extractor::extract_content;
use crate::fetcher::{FetchError, Fetcher};
use crate::inference::{ClassifyError, Classification, Classify};
use crate::safety::{UnsafeUrl, UrlGuard};
use crate::text::normalize_with_limit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyRequest {
    Text(String),
    Url(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Text,
    Url,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing {0:?} field")]
    Missing(MissingField),

    #[error("text has no classifiable words")]
    NothingToClassify,

    #[error("unsafe url: {0}")]
    UnsafeUrl(#[from] UnsafeUrl),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extracted {chars} characters, need at least {min}")]
    ContentTooShort { chars: usize, min: usize },

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

pub struct Orchestrator {
    guard: Arc<dyn UrlGuard>,
    fetcher: Fetcher,
    classifier: Arc<dyn Classify>,
    limits: PipelineLimits,
}

impl Orchestrator {
    pub fn new(
        guard: Arc<dyn UrlGuard>,
        fetcher: Fetcher,
        classifier: Arc<dyn Classify>,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            guard,
            fetcher,
            classifier,
            limits,
        }
    }

    pub fn limits(&self) -> PipelineLimits {
        self.limits
    }

    pub async fn run(&self, request: ClassifyRequest) -> Result<Classification, PipelineError> {
        match request {
            ClassifyRequest::Text(text) => self.classify_text(&text).await,
            ClassifyRequest::Url(url) => self.classify_url(&url).await,
        }
    }

    /// Standalone safety check. Blank input is treated as an invalid URL.
    pub async fn verify_url(&self, url: &str) -> Result<(), UnsafeUrl> {
        let url = url.trim();
        if url.is_empty() {
            return Err(UnsafeUrl::Invalid);
        }
        self.guard.validate(url).await
    }

    #[instrument(skip_all, fields(chars = text.chars().count()))]
    async fn classify_text(&self, text: &str) -> Result<Classification, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::Missing(MissingField::Text));
        }
        self.normalize_and_classify(text).await
    }

    #[instrument(skip(self))]
    async fn classify_url(&self, url: &str) -> Result<Classification, PipelineError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PipelineError::Missing(MissingField::Url));
        }

        self.guard.validate(url).await?;
        let page = self.fetcher.fetch(url).await?;
        let content = extract_content(&page.body);

        let chars = content.chars().count();
        if chars < self.limits.min_content_chars {
            info!(chars, final_url = %page.url_final, "extracted content below threshold");
            return Err(PipelineError::ContentTooShort {
                chars,
                min: self.limits.min_content_chars,
            });
        }

        self.normalize_and_classify(&content).await
    }

    async fn normalize_and_classify(&self, raw: &str) -> Result<Classification, PipelineError> {
        let text = normalize_with_limit(raw, self.limits.max_text_chars);
        if text.is_empty() {
            return Err(PipelineError::NothingToClassify);
        }
        Ok(self.classifier.classify(text).await?)
    }
}
