//! Pipeline supervisor.
//!
//! The supervisor owns the run: it builds the shared state, spawns the
//! workers of every stage and, when asked to stop, tears everything down in
//! a fixed order:
//!
//! 1. raise the shutdown signal (workers see it at their next delay),
//! 2. join every worker, so no guarded section is still in flight,
//! 3. release the stage guards and the shared state, once.
//!
//! The same teardown runs whether it was triggered by an external signal,
//! an `Op::Shutdown`, or all workers exiting on their own.

pub mod error;
pub mod report;

use crate::config::loader::validate;
use crate::events::EventSink;
use crate::state::{PipelineStats, SharedState};
use crate::supervisor::error::{SupervisorError, SupervisorResult};
use crate::supervisor::report::{ShutdownReport, StopReason, WorkerExit};
use crate::worker::coin::CoinPolicy;
use crate::worker::error::WorkerResult;
use crate::worker::{Worker, WorkerContext, WorkerReport};
use pl_protocol::config_models::PipelineConfig;
use pl_protocol::ipc::{Event, Op};
use pl_protocol::stage_models::{Stage, StageCounts};
use pl_protocol::worker_models::{WorkerId, WorkerStatus};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Configures and starts a [`PipelineSupervisor`].
pub struct SupervisorBuilder {
    config: PipelineConfig,
    events: EventSink,
    coin: CoinPolicy,
}

impl SupervisorBuilder {
    /// Send pipeline events to `events`.
    pub fn events(mut self, events: impl Into<EventSink>) -> Self {
        self.events = events.into();
        self
    }

    /// Choose how inspection workers decide pass/fail.
    pub fn coin(mut self, coin: CoinPolicy) -> Self {
        self.coin = coin;
        self
    }

    /// Validate, build shared state and spawn every worker.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error, before any worker is spawned, if the configuration
    /// is invalid or no runtime is available.
    pub fn start(self) -> SupervisorResult<PipelineSupervisor> {
        let SupervisorBuilder {
            config,
            events,
            coin,
        } = self;

        validate(&config)?;
        let handle = Handle::try_current().map_err(|e| SupervisorError::NoRuntime {
            reason: e.to_string(),
        })?;

        let run_id = Uuid::new_v4();
        let initial = config.initial_counts();
        let state = Arc::new(SharedState::new(initial));
        let stats = Arc::new(PipelineStats::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            %run_id,
            counts = %initial,
            inspection = config.workers.inspection,
            sharpening = config.workers.sharpening,
            quality_control = config.workers.quality_control,
            "pipeline starting"
        );
        events.emit(Event::PipelineStarted {
            run_id,
            counts: initial,
            workers: config.workers.total(),
        });

        let ctx = WorkerContext {
            state: Arc::clone(&state),
            stats: Arc::clone(&stats),
            events: events.clone(),
            shutdown: shutdown_rx,
        };

        let mut seeds = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut workers = JoinSet::new();
        for stage in Stage::ALL {
            for index in 0..config.workers.get(stage) {
                let mut rng = StdRng::from_rng(&mut seeds);
                let coin = coin.make(&mut rng);
                let worker = Worker::new(
                    WorkerId::new(stage, index),
                    config.delay,
                    rng,
                    coin,
                    ctx.clone(),
                );
                workers.spawn_on(worker.run(), &handle);
            }
        }
        drop(ctx);

        Ok(PipelineSupervisor {
            run_id,
            initial,
            state,
            stats,
            events,
            shutdown_tx,
            workers,
            exits: Vec::new(),
            stop_reason: None,
            report: None,
        })
    }
}

/// Runs one pipeline from startup to teardown.
///
/// # Example
///
/// ```rust,no_run
/// use pl_core::supervisor::PipelineSupervisor;
/// use pl_protocol::config_models::PipelineConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut supervisor = PipelineSupervisor::start(PipelineConfig::default())?;
/// let report = supervisor
///     .run_until(async {
///         let _ = tokio::signal::ctrl_c().await;
///     })
///     .await;
/// println!("finalized {} pins", report.stats.finalized);
/// # Ok(())
/// # }
/// ```
pub struct PipelineSupervisor {
    run_id: Uuid,
    initial: StageCounts,
    state: Arc<SharedState>,
    stats: Arc<PipelineStats>,
    events: EventSink,
    shutdown_tx: watch::Sender<bool>,
    workers: JoinSet<WorkerResult<WorkerReport>>,
    exits: Vec<WorkerExit>,
    stop_reason: Option<StopReason>,
    report: Option<ShutdownReport>,
}

impl PipelineSupervisor {
    pub fn builder(config: PipelineConfig) -> SupervisorBuilder {
        SupervisorBuilder {
            config,
            events: EventSink::disabled(),
            coin: CoinPolicy::default(),
        }
    }

    /// Start with default options and no event sink.
    pub fn start(config: PipelineConfig) -> SupervisorResult<Self> {
        Self::builder(config).start()
    }

    /// Number of workers that have not exited yet.
    pub fn running_workers(&self) -> usize {
        self.workers.len()
    }

    /// Handle to the shared counters.
    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    /// Current counter values.
    ///
    /// # Errors
    ///
    /// Fails once shared state has been released.
    pub async fn snapshot(&self) -> SupervisorResult<StageCounts> {
        Ok(self.state.snapshot().await?)
    }

    pub fn is_shut_down(&self) -> bool {
        self.report.is_some()
    }

    /// Run until `signal` completes (or every worker exits), then shut down.
    pub async fn run_until<F>(&mut self, signal: F) -> ShutdownReport
    where
        F: Future<Output = ()>,
    {
        self.supervise(signal, None).await
    }

    /// Run while serving operations from `ops`, then shut down.
    ///
    /// Stops on `Op::Shutdown`, on `signal`, or when every worker exits.
    /// A closed `ops` channel is not a stop request.
    pub async fn run<F>(&mut self, ops: mpsc::UnboundedReceiver<Op>, signal: F) -> ShutdownReport
    where
        F: Future<Output = ()>,
    {
        self.supervise(signal, Some(ops)).await
    }

    async fn supervise<F>(
        &mut self,
        signal: F,
        mut ops: Option<mpsc::UnboundedReceiver<Op>>,
    ) -> ShutdownReport
    where
        F: Future<Output = ()>,
    {
        if self.report.is_none() {
            tokio::pin!(signal);

            let reason = loop {
                tokio::select! {
                    _ = &mut signal => break StopReason::Signal,
                    op = next_op(&mut ops) => match op {
                        Op::Snapshot => self.publish_snapshot().await,
                        Op::Shutdown => break StopReason::Requested,
                    },
                    joined = self.workers.join_next() => match joined {
                        Some(joined) => self.record_exit(joined),
                        None => {
                            warn!(run_id = %self.run_id, "all workers exited without a shutdown request");
                            break StopReason::WorkersExited;
                        }
                    },
                }
            };
            self.stop_reason = Some(reason);
        }

        self.shutdown().await
    }

    async fn publish_snapshot(&self) {
        match self.state.snapshot().await {
            Ok(counts) => {
                debug!(counts = %counts, "snapshot requested");
                self.events.emit(Event::CountsSnapshot { counts });
            }
            Err(e) => warn!(error = %e, "snapshot failed"),
        }
    }

    /// Stop every worker and release shared state.
    ///
    /// Safe to call at any time, any number of times. The first call does the
    /// teardown; later calls return the same report without touching state.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        if let Some(report) = &self.report {
            debug!(run_id = %self.run_id, "shutdown already completed");
            return report.clone();
        }

        let reason = self.stop_reason.unwrap_or(StopReason::Requested);
        info!(run_id = %self.run_id, ?reason, "stopping workers");

        // Stored even if every receiver is gone already.
        self.shutdown_tx.send_replace(true);
        while let Some(joined) = self.workers.join_next().await {
            self.record_exit(joined);
        }

        let stats = self.stats.snapshot();
        let release = self.state.release().await;
        let release_errors: Vec<String> = release.errors.iter().map(ToString::to_string).collect();
        if !release_errors.is_empty() {
            warn!(errors = ?release_errors, "shared state released with errors");
        }

        let report = ShutdownReport {
            run_id: self.run_id,
            reason,
            initial: self.initial,
            counts: release.counts,
            stats,
            exits: std::mem::take(&mut self.exits),
            release_errors,
        };

        info!(
            run_id = %self.run_id,
            counts = %report.counts,
            discarded = stats.discarded,
            finalized = stats.finalized,
            "pipeline stopped"
        );
        self.events.emit(Event::PipelineStopped {
            run_id: self.run_id,
            counts: report.counts,
            discarded: stats.discarded,
            finalized: stats.finalized,
        });

        self.report = Some(report.clone());
        report
    }

    fn record_exit(&mut self, joined: Result<WorkerResult<WorkerReport>, JoinError>) {
        let exit = match joined {
            Ok(Ok(report)) => WorkerExit {
                worker: Some(report.worker),
                status: WorkerStatus::Stopped,
                report: Some(report),
                error: None,
            },
            Ok(Err(e)) => WorkerExit {
                worker: Some(e.worker()),
                status: WorkerStatus::Failed,
                report: None,
                error: Some(e.to_string()),
            },
            Err(e) => {
                error!(error = %e, "worker task crashed");
                WorkerExit {
                    worker: None,
                    status: WorkerStatus::Crashed,
                    report: None,
                    error: Some(e.to_string()),
                }
            }
        };
        self.exits.push(exit);
    }
}

/// Next operation from `ops`; never resolves if there is no open channel.
async fn next_op(ops: &mut Option<mpsc::UnboundedReceiver<Op>>) -> Op {
    if let Some(rx) = ops {
        if let Some(op) = rx.recv().await {
            return op;
        }
    }
    std::future::pending().await
}
