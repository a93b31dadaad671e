//! Stage workers.
//!
//! A worker loops forever: it sleeps for a random delay (simulated work),
//! then tries to take one item from its stage and hand it on according to
//! its stage's [`TransferRule`]. The delay is the only point where the
//! shutdown signal is observed, so a transfer that has started always
//! finishes.
//!
//! A worker holds at most one stage guard at a time. The decrement of its own
//! stage and the increment of the next stage are two separate guarded
//! sections, taken one after the other.

pub mod coin;
pub mod error;

use crate::events::EventSink;
use crate::state::{PipelineStats, SharedState, StateError};
use crate::worker::coin::Coin;
use crate::worker::error::{WorkerError, WorkerResult};
use pl_protocol::config_models::DelayRange;
use pl_protocol::ipc::Event;
use pl_protocol::stage_models::Stage;
use pl_protocol::worker_models::WorkerId;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What happens to an item after it has been taken from a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRule {
    /// Flip a coin: pass to the next stage or discard.
    Inspect { next: Stage },
    /// Always hand on to the next stage.
    Forward { next: Stage },
    /// The item is finished and leaves the system.
    Finalize,
}

impl TransferRule {
    /// Inspection flips the coin; every other stage with a downstream
    /// neighbour forwards, and the last stage finalizes.
    pub fn for_stage(stage: Stage) -> Self {
        match (stage, stage.downstream()) {
            (_, None) => TransferRule::Finalize,
            (Stage::Inspection, Some(next)) => TransferRule::Inspect { next },
            (_, Some(next)) => TransferRule::Forward { next },
        }
    }
}

/// Result of one take-and-transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// The stage was empty; nothing changed.
    Empty,
    /// Inspection passed, item moved downstream.
    Passed,
    /// Inspection failed, item discarded.
    Discarded,
    /// Item moved downstream unconditionally.
    Forwarded,
    /// Item left the system.
    Finalized,
}

/// Everything a worker shares with the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub state: Arc<SharedState>,
    pub stats: Arc<PipelineStats>,
    pub events: EventSink,
    pub shutdown: watch::Receiver<bool>,
}

/// Per-worker totals, returned when the worker stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub iterations: u64,
    pub empty_polls: u64,
    pub handled: u64,
}

pub struct Worker {
    id: WorkerId,
    rule: TransferRule,
    delay: DelayRange,
    rng: StdRng,
    coin: Box<dyn Coin>,
    ctx: WorkerContext,
}

impl Worker {
    /// Create a worker for `id.stage`. The coin is only flipped by inspection
    /// workers.
    pub fn new(
        id: WorkerId,
        delay: DelayRange,
        rng: StdRng,
        coin: Box<dyn Coin>,
        ctx: WorkerContext,
    ) -> Self {
        Self {
            id,
            rule: TransferRule::for_stage(id.stage),
            delay,
            rng,
            coin,
            ctx,
        }
    }

    /// Run until the shutdown signal is seen at a delay checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::StateLost` if shared state was released under
    /// the worker. That ends the worker; it is not retried.
    pub async fn run(mut self) -> WorkerResult<WorkerReport> {
        let mut report = WorkerReport {
            worker: self.id,
            iterations: 0,
            empty_polls: 0,
            handled: 0,
        };

        debug!(worker = %self.id, "worker started");

        while self.wait_delay().await {
            report.iterations += 1;
            self.ctx.events.emit(Event::DelayCompleted { worker: self.id });

            match self.attempt().await {
                Ok(Attempt::Empty) => report.empty_polls += 1,
                Ok(_) => report.handled += 1,
                Err(source) => {
                    let error = WorkerError::StateLost {
                        worker: self.id,
                        source,
                    };
                    warn!(worker = %self.id, error = %error, "worker terminated");
                    self.ctx.events.emit(Event::WorkerFailed {
                        worker: self.id,
                        error: error.to_string(),
                    });
                    return Err(error);
                }
            }
        }

        debug!(
            worker = %self.id,
            iterations = report.iterations,
            handled = report.handled,
            "worker stopped"
        );
        self.ctx.events.emit(Event::WorkerStopped { worker: self.id });
        Ok(report)
    }

    /// Sleep for one random delay. Returns `false` if shutdown was requested
    /// before or during the sleep.
    async fn wait_delay(&mut self) -> bool {
        if self.stop_requested() {
            return false;
        }

        let delay = self.next_delay();
        tokio::select! {
            biased;
            // A dropped sender also means stop.
            _ = self.ctx.shutdown.changed() => false,
            _ = tokio::time::sleep(delay) => !self.stop_requested(),
        }
    }

    fn stop_requested(&self) -> bool {
        *self.ctx.shutdown.borrow()
    }

    fn next_delay(&mut self) -> Duration {
        let ms = self.rng.random_range(self.delay.min_ms..=self.delay.max_ms);
        Duration::from_millis(ms)
    }

    /// Take one item from this worker's stage and apply the transfer rule.
    pub async fn attempt(&mut self) -> Result<Attempt, StateError> {
        let stage = self.id.stage;
        let Some(remaining) = self.ctx.state.try_take(stage).await? else {
            self.ctx.stats.record_empty(stage);
            info!(worker = %self.id, "stage empty");
            self.ctx.events.emit(Event::StageEmpty { worker: self.id });
            return Ok(Attempt::Empty);
        };

        self.ctx.stats.record_taken(stage);
        self.ctx.events.emit(Event::ItemTaken {
            worker: self.id,
            remaining,
        });

        let attempt = match self.rule {
            TransferRule::Inspect { next } => {
                if self.coin.flip() {
                    self.ctx.state.put(next).await?;
                    self.ctx.stats.record_passed();
                    info!(worker = %self.id, "item passed inspection");
                    self.ctx.events.emit(Event::ItemPassed { worker: self.id });
                    Attempt::Passed
                } else {
                    self.ctx.stats.record_discarded();
                    info!(worker = %self.id, "item failed inspection");
                    self.ctx.events.emit(Event::ItemDiscarded { worker: self.id });
                    Attempt::Discarded
                }
            }
            TransferRule::Forward { next } => {
                self.ctx.state.put(next).await?;
                self.ctx.stats.record_forwarded();
                info!(worker = %self.id, to = %next, "item forwarded");
                self.ctx.events.emit(Event::ItemForwarded {
                    worker: self.id,
                    to: next,
                });
                Attempt::Forwarded
            }
            TransferRule::Finalize => {
                self.ctx.stats.record_finalized();
                info!(worker = %self.id, "item finalized");
                self.ctx.events.emit(Event::ItemFinalized { worker: self.id });
                Attempt::Finalized
            }
        };

        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::coin::FixedCoin;
    use pl_protocol::stage_models::StageCounts;
    use rand::SeedableRng;
    use tokio::sync::mpsc;

    struct Harness {
        state: Arc<SharedState>,
        stats: Arc<PipelineStats>,
        shutdown_tx: watch::Sender<bool>,
        events_rx: mpsc::UnboundedReceiver<Event>,
        ctx: WorkerContext,
    }

    fn harness(counts: StageCounts) -> Harness {
        let state = Arc::new(SharedState::new(counts));
        let stats = Arc::new(PipelineStats::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let ctx = WorkerContext {
            state: Arc::clone(&state),
            stats: Arc::clone(&stats),
            events: EventSink::new(events_tx),
            shutdown: shutdown_rx,
        };
        Harness {
            state,
            stats,
            shutdown_tx,
            events_rx,
            ctx,
        }
    }

    fn worker(h: &Harness, stage: Stage, coin: bool) -> Worker {
        Worker::new(
            WorkerId::new(stage, 0),
            DelayRange::new(1, 3),
            StdRng::seed_from_u64(1),
            Box::new(FixedCoin(coin)),
            h.ctx.clone(),
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_transfer_rules() {
        assert_eq!(
            TransferRule::for_stage(Stage::Inspection),
            TransferRule::Inspect {
                next: Stage::Sharpening
            }
        );
        assert_eq!(
            TransferRule::for_stage(Stage::Sharpening),
            TransferRule::Forward {
                next: Stage::QualityControl
            }
        );
        assert_eq!(
            TransferRule::for_stage(Stage::QualityControl),
            TransferRule::Finalize
        );
    }

    #[tokio::test]
    async fn test_inspection_pass_moves_item() {
        let mut h = harness(StageCounts::new(1, 0, 0));
        let mut w = worker(&h, Stage::Inspection, true);

        assert_eq!(w.attempt().await, Ok(Attempt::Passed));
        assert_eq!(h.state.snapshot().await.unwrap(), StageCounts::new(0, 1, 0));
        assert_eq!(h.stats.snapshot().passed, 1);

        let events = drain(&mut h.events_rx);
        assert!(matches!(events[0], Event::ItemTaken { remaining: 0, .. }));
        assert!(matches!(events[1], Event::ItemPassed { .. }));
    }

    #[tokio::test]
    async fn test_inspection_fail_discards_item() {
        let h = harness(StageCounts::new(1, 0, 0));
        let mut w = worker(&h, Stage::Inspection, false);

        assert_eq!(w.attempt().await, Ok(Attempt::Discarded));
        assert_eq!(h.state.snapshot().await.unwrap(), StageCounts::new(0, 0, 0));
        assert_eq!(h.stats.snapshot().discarded, 1);
        assert_eq!(h.stats.snapshot().passed, 0);
    }

    #[tokio::test]
    async fn test_sharpening_always_forwards() {
        let h = harness(StageCounts::new(0, 2, 0));
        // The coin is ignored outside inspection.
        let mut w = worker(&h, Stage::Sharpening, false);

        assert_eq!(w.attempt().await, Ok(Attempt::Forwarded));
        assert_eq!(w.attempt().await, Ok(Attempt::Forwarded));
        assert_eq!(w.attempt().await, Ok(Attempt::Empty));
        assert_eq!(h.state.snapshot().await.unwrap(), StageCounts::new(0, 0, 2));
    }

    #[tokio::test]
    async fn test_quality_control_finalizes_without_touching_other_counters() {
        let h = harness(StageCounts::new(4, 5, 1));
        let mut w = worker(&h, Stage::QualityControl, true);

        assert_eq!(w.attempt().await, Ok(Attempt::Finalized));
        assert_eq!(h.state.snapshot().await.unwrap(), StageCounts::new(4, 5, 0));
        assert_eq!(h.stats.finalized(), 1);
    }

    #[tokio::test]
    async fn test_empty_stage_is_noop() {
        let mut h = harness(StageCounts::default());
        for stage in Stage::ALL {
            let mut w = worker(&h, stage, true);
            assert_eq!(w.attempt().await, Ok(Attempt::Empty));
        }
        assert_eq!(h.state.snapshot().await.unwrap(), StageCounts::default());
        assert_eq!(h.stats.snapshot().empty_polls, StageCounts::new(1, 1, 1));

        let events = drain(&mut h.events_rx);
        assert!(events.iter().all(|e| matches!(e, Event::StageEmpty { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let mut h = harness(StageCounts::new(3, 0, 0));
        let w = worker(&h, Stage::Inspection, true);
        let handle = tokio::spawn(w.run());

        tokio::time::sleep(Duration::from_millis(50)).await;
        h.shutdown_tx.send(true).unwrap();

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.handled, 3);
        assert!(report.empty_polls > 0);
        assert_eq!(h.state.snapshot().await.unwrap(), StageCounts::new(0, 3, 0));

        let events = drain(&mut h.events_rx);
        assert!(matches!(events.last(), Some(Event::WorkerStopped { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_before_first_delay() {
        let h = harness(StageCounts::new(3, 0, 0));
        h.shutdown_tx.send(true).unwrap();

        let report = worker(&h, Stage::Inspection, true).run().await.unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(h.state.snapshot().await.unwrap(), StageCounts::new(3, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fails_when_state_released() {
        let mut h = harness(StageCounts::new(3, 0, 0));
        h.state.release().await;

        let result = worker(&h, Stage::Inspection, true).run().await;
        assert_eq!(
            result,
            Err(WorkerError::StateLost {
                worker: WorkerId::new(Stage::Inspection, 0),
                source: StateError::Released {
                    stage: Stage::Inspection
                },
            })
        );

        let events = drain(&mut h.events_rx);
        assert!(matches!(events.last(), Some(Event::WorkerFailed { .. })));
    }
}
