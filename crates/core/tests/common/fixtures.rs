//! Test fixtures for building pipeline configurations and runs.

use pl_core::worker::coin::CoinPolicy;
use pl_core::PipelineSupervisor;
use pl_protocol::config_models::{DelayRange, PipelineConfig, StageWorkers};
use pl_protocol::ipc::Event;
use tokio::sync::mpsc;

/// Configuration with millisecond delays, suitable for paused-clock tests.
#[allow(dead_code)]
pub fn fast_config(workers: StageWorkers, inventory: u64) -> PipelineConfig {
    PipelineConfig {
        workers,
        initial_inventory: inventory,
        delay: DelayRange::new(1, 3),
        seed: Some(7),
    }
}

/// Start a supervisor that reports events to the returned receiver.
#[allow(dead_code)]
pub fn start_with_events(
    config: PipelineConfig,
    coin: CoinPolicy,
) -> (PipelineSupervisor, mpsc::UnboundedReceiver<Event>) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let supervisor = PipelineSupervisor::builder(config)
        .events(events_tx)
        .coin(coin)
        .start()
        .expect("Failed to start supervisor");
    (supervisor, events_rx)
}

/// Collect every event currently buffered in `rx`.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
