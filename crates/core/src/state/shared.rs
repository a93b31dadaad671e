//! Stage counters and their guards.
//!
//! Each stage counter lives inside its own `StageGuard`, a mutex whose slot
//! holds the counter until the guard is released. A counter can only be read
//! or changed through [`SharedState::with_guard`], which takes a synchronous
//! closure: nothing awaits while a guard is held, and a caller never holds
//! two guards at once.
//!
//! Consumers never block on an empty stage. Taking from a zero counter is a
//! no-op and the caller retries after its next delay, so the pipeline polls
//! rather than queues.

use crate::state::error::{StateError, StateResult};
use pl_protocol::stage_models::{Stage, StageCounts};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Mutual exclusion for one stage counter.
///
/// The slot is `None` once the guard has been released.
#[derive(Debug)]
pub struct StageGuard {
    stage: Stage,
    slot: Mutex<Option<u64>>,
}

impl StageGuard {
    fn new(stage: Stage, initial: u64) -> Self {
        Self {
            stage,
            slot: Mutex::new(Some(initial)),
        }
    }

    /// The stage whose counter this guard protects.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    async fn with_counter<R>(&self, f: impl FnOnce(&mut u64) -> R) -> StateResult<R> {
        let mut slot = self.slot.lock().await;
        match slot.as_mut() {
            Some(counter) => Ok(f(counter)),
            None => Err(StateError::Released { stage: self.stage }),
        }
    }

    /// Waits for any current holder, then takes the counter out of the slot.
    async fn release(&self) -> StateResult<u64> {
        let mut slot = self.slot.lock().await;
        slot.take()
            .ok_or(StateError::AlreadyReleased { stage: self.stage })
    }
}

/// Outcome of [`SharedState::release`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Counter values at the moment each guard was released.
    ///
    /// Stages whose release failed keep 0 here.
    pub counts: StageCounts,

    /// Every problem met during release. Empty on a clean first release.
    pub errors: Vec<StateError>,
}

impl ReleaseReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The three stage counters shared by every worker.
///
/// # Example
///
/// ```rust
/// use pl_core::state::SharedState;
/// use pl_protocol::stage_models::{Stage, StageCounts};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let state = SharedState::new(StageCounts::new(10, 0, 0));
/// let remaining = state.try_take(Stage::Inspection).await?;
/// assert_eq!(remaining, Some(9));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SharedState {
    guards: [StageGuard; 3],
    released: AtomicBool,
}

impl SharedState {
    /// Create shared state holding the given starting counters.
    pub fn new(initial: StageCounts) -> Self {
        Self {
            guards: Stage::ALL.map(|stage| StageGuard::new(stage, initial.get(stage))),
            released: AtomicBool::new(false),
        }
    }

    /// The guard bound to `stage`'s counter.
    pub fn guard(&self, stage: Stage) -> &StageGuard {
        &self.guards[stage.index()]
    }

    /// Run `f` with exclusive access to `stage`'s counter.
    ///
    /// The guard is dropped on every exit path, including a panic inside `f`.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Released` if the guard has been released.
    pub async fn with_guard<R>(
        &self,
        stage: Stage,
        f: impl FnOnce(&mut u64) -> R,
    ) -> StateResult<R> {
        self.guard(stage).with_counter(f).await
    }

    /// Take one item from `stage` if any is waiting.
    ///
    /// Returns the number of items left after the decrement, or `None` when
    /// the counter was already zero (nothing is changed in that case).
    pub async fn try_take(&self, stage: Stage) -> StateResult<Option<u64>> {
        self.with_guard(stage, |count| {
            if *count == 0 {
                None
            } else {
                *count -= 1;
                Some(*count)
            }
        })
        .await
    }

    /// Add one item to `stage`, returning the new count.
    ///
    /// Counters have no upper bound.
    pub async fn put(&self, stage: Stage) -> StateResult<u64> {
        self.with_guard(stage, |count| {
            *count += 1;
            *count
        })
        .await
    }

    /// Read all three counters.
    ///
    /// Each counter is read under its own guard, one after another, so the
    /// result is not an atomic cut across stages while workers are running.
    pub async fn snapshot(&self) -> StateResult<StageCounts> {
        let mut counts = StageCounts::default();
        for stage in Stage::ALL {
            let value = self.with_guard(stage, |count| *count).await?;
            counts.set(stage, value);
        }
        Ok(counts)
    }

    /// Release every guard, then the shared state itself.
    ///
    /// Each step is attempted even if an earlier one failed. A guard that is
    /// held is waited for, never forced. Calling this again is harmless: it
    /// reports `AlreadyReleased` for each guard and touches nothing.
    pub async fn release(&self) -> ReleaseReport {
        let mut report = ReleaseReport::default();

        for guard in &self.guards {
            match guard.release().await {
                Ok(value) => {
                    debug!(stage = %guard.stage(), value, "stage guard released");
                    report.counts.set(guard.stage(), value);
                }
                Err(e) => {
                    warn!(stage = %guard.stage(), error = %e, "stage guard release failed");
                    report.errors.push(e);
                }
            }
        }

        if self.released.swap(true, Ordering::AcqRel) {
            warn!("shared state release requested twice");
            report.errors.push(StateError::StateAlreadyReleased);
        }

        report
    }

    /// Whether [`release`](Self::release) has completed at least once.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}
