//! Error types for the worker loop.

use crate::state::error::StateError;
use pl_protocol::worker_models::WorkerId;
use thiserror::Error;

/// Conditions that end a worker abruptly.
///
/// An empty stage is not an error; the only failure is losing access to the
/// shared state, which is never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    #[error("Worker {worker} lost access to shared state: {source}")]
    StateLost {
        worker: WorkerId,
        #[source]
        source: StateError,
    },
}

impl WorkerError {
    /// The worker that failed.
    pub fn worker(&self) -> WorkerId {
        match self {
            WorkerError::StateLost { worker, .. } => *worker,
        }
    }
}

/// Type alias for Result with WorkerError.
pub type WorkerResult<T> = Result<T, WorkerError>;
