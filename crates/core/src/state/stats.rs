//! Transfer statistics.
//!
//! Tallies are plain atomics updated outside the stage guards. They are only
//! consistent with the counters once every worker has stopped.

use pl_protocol::stage_models::{Stage, StageCounts};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    taken: [AtomicU64; 3],
    empty_polls: [AtomicU64; 3],
    passed: AtomicU64,
    discarded: AtomicU64,
    forwarded: AtomicU64,
    finalized: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_taken(&self, stage: Stage) {
        self.taken[stage.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty(&self, stage: Stage) {
        self.empty_polls[stage.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_passed(&self) {
        self.passed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_finalized(&self) {
        self.finalized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn finalized(&self) -> u64 {
        self.finalized.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let mut taken = StageCounts::default();
        let mut empty_polls = StageCounts::default();
        for stage in Stage::ALL {
            taken.set(stage, self.taken[stage.index()].load(Ordering::Relaxed));
            empty_polls.set(stage, self.empty_polls[stage.index()].load(Ordering::Relaxed));
        }

        StatsSnapshot {
            taken,
            empty_polls,
            passed: self.passed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            finalized: self.finalized.load(Ordering::Relaxed),
        }
    }
}

/// Frozen copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Successful decrements per stage.
    pub taken: StageCounts,
    /// Attempts that found the stage empty.
    pub empty_polls: StageCounts,
    /// Inspection → sharpening transfers.
    pub passed: u64,
    /// Items rejected at inspection.
    pub discarded: u64,
    /// Sharpening → quality control transfers.
    pub forwarded: u64,
    /// Items that left quality control.
    pub finalized: u64,
}

impl StatsSnapshot {
    /// Items still known to the system: waiting in a stage or already accounted
    /// for as discarded or finalized.
    pub fn accounted(&self, counts: &StageCounts) -> u64 {
        counts.total() + self.discarded + self.finalized
    }

    /// Items taken from a stage but not yet handed on.
    pub fn in_flight(&self) -> u64 {
        let resolved = self.passed + self.discarded + self.forwarded + self.finalized;
        self.taken.total().saturating_sub(resolved)
    }

    /// Items that ever arrived at `stage`, given its starting inventory.
    pub fn arrived(&self, stage: Stage, initial: &StageCounts) -> u64 {
        let transferred_in = match stage {
            Stage::Inspection => 0,
            Stage::Sharpening => self.passed,
            Stage::QualityControl => self.forwarded,
        };
        initial.get(stage) + transferred_in
    }
}
