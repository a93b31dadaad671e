//! What a supervisor hands back once the pipeline has stopped.

use crate::state::StatsSnapshot;
use crate::worker::WorkerReport;
use pl_protocol::stage_models::StageCounts;
use pl_protocol::worker_models::{WorkerId, WorkerStatus};
use serde::Serialize;
use uuid::Uuid;

/// Why the supervisor began teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// The external shutdown signal arrived.
    Signal,
    /// An `Op::Shutdown` was received, or `shutdown()` was called directly.
    Requested,
    /// Every worker exited on its own. Not a normal path.
    WorkersExited,
}

/// How one worker ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerExit {
    /// Unknown when the task panicked.
    pub worker: Option<WorkerId>,
    pub status: WorkerStatus,
    pub report: Option<WorkerReport>,
    pub error: Option<String>,
}

/// Final state of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    pub run_id: Uuid,
    pub reason: StopReason,
    /// Starting counters.
    pub initial: StageCounts,
    /// Counters as they were when their guards were released.
    pub counts: StageCounts,
    pub stats: StatsSnapshot,
    pub exits: Vec<WorkerExit>,
    /// Problems met while releasing guards and state. Empty on a clean run.
    pub release_errors: Vec<String>,
}

impl ShutdownReport {
    /// Number of workers that stopped at a checkpoint as asked.
    pub fn stopped_workers(&self) -> usize {
        self.exits
            .iter()
            .filter(|exit| exit.status == WorkerStatus::Stopped)
            .count()
    }

    /// Whether every item that entered the pipeline is accounted for.
    pub fn is_conserved(&self) -> bool {
        self.stats.in_flight() == 0 && self.stats.accounted(&self.counts) == self.initial.total()
    }
}
