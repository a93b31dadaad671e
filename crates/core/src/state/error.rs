//! Error types for shared state access.

use pl_protocol::stage_models::Stage;
use thiserror::Error;

/// Errors raised by `SharedState` and `StageGuard`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The guard was released while a worker still wanted to use it.
    #[error("Guard for stage {stage} has been released")]
    Released { stage: Stage },

    /// A release was attempted on a guard that is already gone.
    #[error("Guard for stage {stage} was already released")]
    AlreadyReleased { stage: Stage },

    /// A release was attempted on shared state that is already gone.
    #[error("Shared state was already released")]
    StateAlreadyReleased,
}

/// Type alias for Result with StateError.
pub type StateResult<T> = Result<T, StateError>;
