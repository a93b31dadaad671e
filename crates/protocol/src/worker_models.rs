//! Worker identity models.

use crate::stage_models::Stage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a single worker: the stage it serves and its index within it.
///
/// Indices start at 0 and are unique per stage only.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pub stage: Stage,
    pub index: usize,
}

impl WorkerId {
    pub fn new(stage: Stage, index: usize) -> Self {
        Self { stage, index }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.stage, self.index)
    }
}

/// How a worker left its loop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    /// Stopped at a delay checkpoint after the shutdown signal.
    Stopped,

    /// Terminated because shared state became unusable.
    Failed,

    /// The task panicked or was aborted.
    Crashed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_id_display() {
        let id = WorkerId::new(Stage::Sharpening, 4);
        assert_eq!(id.to_string(), "sharpening#4");
    }
}
