//! Error types for supervisor startup and queries.

use crate::config::error::ConfigError;
use crate::state::error::StateError;
use thiserror::Error;

/// Errors raised by `PipelineSupervisor`.
///
/// Startup errors are returned before any worker has been spawned.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The configuration cannot be run.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Workers need a tokio runtime to run on.
    #[error("No tokio runtime available to spawn workers: {reason}")]
    NoRuntime { reason: String },

    /// Shared state could not be read.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Type alias for Result with SupervisorError.
pub type SupervisorResult<T> = Result<T, SupervisorError>;
