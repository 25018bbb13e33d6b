use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("inference server unreachable: {0}")]
    Unreachable(String),

    #[error("model load failed with status {status}")]
    Http { status: StatusCode },

    #[error("invalid model metadata: {0}")]
    InvalidMetadata(String),

    #[error("model reports {model} labels but the label table has {table}")]
    LabelMismatch { model: usize, table: usize },

    #[error("model load timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Request(String),

    #[error("inference failed with status {status}")]
    Http { status: StatusCode },

    #[error("could not decode model output: {0}")]
    Decode(String),

    #[error("model returned {outputs} scores for {labels} labels")]
    OutputMismatch { outputs: usize, labels: usize },

    #[error("model returned non-finite scores")]
    NonFinite,

    #[error("inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("inference worker is not running")]
    WorkerUnavailable,
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Load(#[from] ModelLoadError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ClassifyError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Load(ModelLoadError::Timeout(_)) | Self::Inference(InferenceError::Timeout(_))
        )
    }
}
