//! Model loading, inference, and output mapping.
//!
//! The model itself lives behind [`backend::ModelLoader`] /
//! [`backend::TextClassifier`]; this module owns the caching discipline
//! around it and turns raw logits into labelled probabilities.

pub mod backend;
pub mod cache;
pub mod classifier;
pub mod errors;
pub mod labels;
pub mod remote;
pub mod scores;
pub mod worker;

pub use backend::{LoadEvent, ModelLoader, ModelSpec, ProgressSink, TextClassifier};
pub use cache::{ModelCache, ModelState};
pub use classifier::{Classify, Classifier};
pub use errors::{ClassifyError, InferenceError, ModelLoadError};
pub use labels::{LabelTable, LabelTableError};
pub use remote::RemoteModelLoader;
pub use scores::{ClassScore, Classification, softmax};
pub use worker::{InferenceWorker, WorkerHandle, WorkerStatus};
