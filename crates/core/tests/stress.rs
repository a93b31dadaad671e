//! Mutual exclusion under real concurrency.
//!
//! Many workers per stage on a multi-threaded runtime with near-zero delays,
//! so guarded sections constantly contend. Afterwards every decrement must
//! be matched by its increment, and the event stream (an independent record
//! of each action) must agree with the counters.

mod common;

use common::*;
use pl_core::worker::coin::CoinPolicy;
use pl_protocol::config_models::{DelayRange, PipelineConfig, StageWorkers};
use pl_protocol::ipc::Event;
use pl_protocol::stage_models::Stage;
use std::time::Duration;

const INVENTORY: u64 = 5_000;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_load_loses_no_updates() {
    let config = PipelineConfig {
        workers: StageWorkers::new(8, 8, 8),
        initial_inventory: INVENTORY,
        delay: DelayRange::new(0, 1),
        seed: Some(42),
    };
    let (mut supervisor, mut events_rx) = start_with_events(config, CoinPolicy::Fair);

    // Sample counters while the workers run.
    let state = supervisor.state();
    let observer = tokio::spawn(async move {
        let mut samples = 0u32;
        while let Ok(counts) = state.snapshot().await {
            assert!(counts.inspection <= INVENTORY);
            assert!(counts.sharpening <= INVENTORY);
            assert!(counts.quality_control <= INVENTORY);
            samples += 1;
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        samples
    });

    let report = supervisor
        .run_until(tokio::time::sleep(Duration::from_millis(500)))
        .await;

    let samples = observer.await.expect("observer panicked");
    assert!(samples > 0);

    assert_clean_teardown(&report, 24);
    assert_conserved(&report);
    assert!(report.stats.taken.get(Stage::Inspection) > 0);

    let events = drain_events(&mut events_rx);
    let taken_events = count_events(&events, |e| matches!(e, Event::ItemTaken { .. }));
    let passed_events = count_events(&events, |e| matches!(e, Event::ItemPassed { .. }));
    let forwarded_events = count_events(&events, |e| matches!(e, Event::ItemForwarded { .. }));
    let finalized_events = count_events(&events, |e| matches!(e, Event::ItemFinalized { .. }));
    let discarded_events = count_events(&events, |e| matches!(e, Event::ItemDiscarded { .. }));

    assert_eq!(taken_events, report.stats.taken.total());
    assert_eq!(passed_events, report.stats.passed);
    assert_eq!(forwarded_events, report.stats.forwarded);
    assert_eq!(finalized_events, report.stats.finalized);
    assert_eq!(discarded_events, report.stats.discarded);
    assert_eq!(
        report.counts.total() + discarded_events + finalized_events,
        INVENTORY
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_counters_never_exceed_arrivals() {
    let config = PipelineConfig {
        workers: StageWorkers::new(16, 2, 1),
        initial_inventory: 1_000,
        delay: DelayRange::new(0, 2),
        seed: None,
    };
    let (mut supervisor, _events_rx) = start_with_events(config, CoinPolicy::Fixed(true));

    let report = supervisor
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    // Inspection outpaces sharpening, so items pile up downstream; that is
    // allowed, but every one of them must be accounted for.
    assert_eq!(report.stats.discarded, 0);
    assert_eq!(report.stats.passed, report.stats.taken.get(Stage::Inspection));
    assert_conserved(&report);
}
