//! Pipeline event protocol.
//!
//! The core reports everything its workers do as `Event`s sent over a
//! channel; a front end renders them (the CLI prints one line per event).
//! `Op` is the reverse direction: requests a front end sends to a running
//! supervisor.
//!
//! Both enums use tagged serialization so they can be written as JSON lines:
//! ```json
//! {
//!   "type": "itemPassed",
//!   "payload": {
//!     "worker": { "stage": "inspection", "index": 2 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage_models::{Stage, StageCounts};
use crate::worker_models::WorkerId;

/// Requests sent to a running supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Ask for the current counter values.
    Snapshot,

    /// Stop every worker and release shared state.
    Shutdown,
}

/// Events emitted by the pipeline core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// Shared state is initialized and workers are about to be spawned.
    PipelineStarted {
        run_id: Uuid,
        counts: StageCounts,
        workers: usize,
    },

    /// A worker finished its simulated work and will try to take an item.
    DelayCompleted { worker: WorkerId },

    /// The worker's stage counter was zero, nothing to take this cycle.
    StageEmpty { worker: WorkerId },

    /// The worker decremented its stage counter and now holds one item.
    ItemTaken { worker: WorkerId, remaining: u64 },

    /// Inspection passed, the item moved to sharpening.
    ItemPassed { worker: WorkerId },

    /// Inspection failed, the item left the system.
    ItemDiscarded { worker: WorkerId },

    /// Sharpening done, the item moved to quality control.
    ItemForwarded { worker: WorkerId, to: Stage },

    /// Quality control done, the item is finished.
    ItemFinalized { worker: WorkerId },

    /// The worker honored the shutdown signal.
    WorkerStopped { worker: WorkerId },

    /// The worker terminated abruptly.
    WorkerFailed { worker: WorkerId, error: String },

    /// Counter values read on request (`Op::Snapshot`).
    CountsSnapshot { counts: StageCounts },

    /// All workers have stopped and shared state has been released.
    PipelineStopped {
        run_id: Uuid,
        counts: StageCounts,
        discarded: u64,
        finalized: u64,
    },
}

impl Event {
    /// The worker this event concerns, if it is a per-worker event.
    pub fn worker(&self) -> Option<WorkerId> {
        match self {
            Event::DelayCompleted { worker }
            | Event::StageEmpty { worker }
            | Event::ItemTaken { worker, .. }
            | Event::ItemPassed { worker }
            | Event::ItemDiscarded { worker }
            | Event::ItemForwarded { worker, .. }
            | Event::ItemFinalized { worker }
            | Event::WorkerStopped { worker }
            | Event::WorkerFailed { worker, .. } => Some(*worker),
            Event::PipelineStarted { .. }
            | Event::CountsSnapshot { .. }
            | Event::PipelineStopped { .. } => None,
        }
    }
}
