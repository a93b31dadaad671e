//! Accounting assertions over shutdown reports and events.

use pl_core::ShutdownReport;
use pl_protocol::ipc::Event;
use pl_protocol::stage_models::Stage;

/// Assert that no item was duplicated or lost during the run.
///
/// Every decrement must be matched by exactly one downstream effect, and
/// every counter must equal what arrived minus what was taken.
#[allow(dead_code)]
pub fn assert_conserved(report: &ShutdownReport) {
    let stats = &report.stats;

    assert_eq!(stats.in_flight(), 0, "items left in flight: {stats:?}");
    assert_eq!(
        stats.taken.get(Stage::Inspection),
        stats.passed + stats.discarded,
        "inspection decrements vs outcomes: {stats:?}"
    );
    assert_eq!(
        stats.taken.get(Stage::Sharpening),
        stats.forwarded,
        "sharpening decrements vs forwards: {stats:?}"
    );
    assert_eq!(
        stats.taken.get(Stage::QualityControl),
        stats.finalized,
        "quality control decrements vs finalized: {stats:?}"
    );

    for stage in Stage::ALL {
        assert_eq!(
            report.counts.get(stage),
            stats.arrived(stage, &report.initial) - stats.taken.get(stage),
            "lost update at {stage}: {report:?}"
        );
    }

    assert_eq!(
        stats.accounted(&report.counts),
        report.initial.total(),
        "items created or destroyed: {report:?}"
    );
    assert!(report.is_conserved());
}

/// Count events matching `pred`.
#[allow(dead_code)]
pub fn count_events(events: &[Event], pred: impl Fn(&Event) -> bool) -> u64 {
    events.iter().filter(|e| pred(e)).count() as u64
}

/// Assert the report shows a clean teardown: every worker stopped, every
/// guard released once.
#[allow(dead_code)]
pub fn assert_clean_teardown(report: &ShutdownReport, workers: usize) {
    assert_eq!(report.exits.len(), workers, "exits: {:?}", report.exits);
    assert_eq!(report.stopped_workers(), workers, "exits: {:?}", report.exits);
    assert!(
        report.release_errors.is_empty(),
        "release errors: {:?}",
        report.release_errors
    );
}
