//! Background inference worker.
//!
//! Jobs arrive over a bounded channel and are processed one at a time.
//! Lifecycle changes are broadcast so observers can follow model loading.

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::backend::{LoadEvent, ProgressSink};
use super::classifier::{Classifier, Classify};
use super::errors::{ClassifyError, InferenceError};
use super::scores::Classification;
use crate::text::NormalizedText;

const STATUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Model load started.
    Initiate,
    /// Model is loaded and serving.
    Ready,
    /// A job finished, successfully or not.
    Complete,
}

struct Job {
    text: NormalizedText,
    reply: oneshot::Sender<Result<Classification, ClassifyError>>,
}

pub struct InferenceWorker;

impl InferenceWorker {
    /// Spawns the worker task and returns a handle for submitting jobs.
    /// The task exits when `shutdown` is cancelled or every handle is dropped.
    pub fn spawn(
        classifier: Classifier,
        queue_depth: usize,
        shutdown: CancellationToken,
    ) -> WorkerHandle {
        let (jobs_tx, jobs_rx) = mpsc::channel(queue_depth.max(1));
        let (status_tx, _) = broadcast::channel(STATUS_CAPACITY);

        let status = status_tx.clone();
        let classifier = classifier.with_progress(ProgressSink::new(move |event| {
            let mapped = match event {
                LoadEvent::Initiate { .. } => WorkerStatus::Initiate,
                LoadEvent::Ready { .. } => WorkerStatus::Ready,
                _ => return,
            };
            // No subscribers is fine.
            let _ = status.send(mapped);
        }));

        tokio::spawn(
            run(classifier, jobs_rx, status_tx.clone(), shutdown)
                .instrument(info_span!("inference_worker")),
        );

        WorkerHandle {
            jobs: jobs_tx,
            status: status_tx,
        }
    }
}

async fn run(
    classifier: Classifier,
    mut jobs: mpsc::Receiver<Job>,
    status: broadcast::Sender<WorkerStatus>,
    shutdown: CancellationToken,
) {
    info!("inference worker started");

    while let Some(job) = tokio::select! {
        _ = shutdown.cancelled() => None,
        job = jobs.recv() => job,
    } {
        let result = classifier.classify(job.text).await;
        if job.reply.send(result).is_err() {
            debug!("caller went away before the result was ready");
        }
        let _ = status.send(WorkerStatus::Complete);
    }

    info!("inference worker stopped");
}

/// Cloneable handle to a running [`InferenceWorker`].
#[derive(Clone)]
pub struct WorkerHandle {
    jobs: mpsc::Sender<Job>,
    status: broadcast::Sender<WorkerStatus>,
}

impl WorkerHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<WorkerStatus> {
        self.status.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.jobs.is_closed()
    }
}

#[async_trait]
impl Classify for WorkerHandle {
    async fn classify(&self, text: NormalizedText) -> Result<Classification, ClassifyError> {
        let (reply, response) = oneshot::channel();
        self.jobs.send(Job { text, reply }).await.map_err(|_| {
            warn!("inference worker is gone");
            InferenceError::WorkerUnavailable
        })?;
        response
            .await
            .map_err(|_| InferenceError::WorkerUnavailable)?
    }
}
