//! Console output: one line per pipeline event, plus a final summary.

use colored::{ColoredString, Colorize};
use pl_core::ShutdownReport;
use pl_protocol::ipc::Event;
use pl_protocol::stage_models::Stage;
use pl_protocol::worker_models::WorkerId;
use tokio::sync::mpsc::UnboundedReceiver;

/// Plain description of what happened.
pub fn describe(event: &Event) -> String {
    match event {
        Event::PipelineStarted {
            run_id,
            counts,
            workers,
        } => format!("pipeline {run_id} started with {workers} workers, counts {counts}"),
        Event::DelayCompleted { .. } => "finished work, checking its stage".to_string(),
        Event::StageEmpty { .. } => "found no pins waiting".to_string(),
        Event::ItemTaken { remaining, .. } => format!("took a pin ({remaining} left)"),
        Event::ItemPassed { .. } => format!("pin passed inspection, sent to {}", Stage::Sharpening),
        Event::ItemDiscarded { .. } => "pin failed inspection, discarded".to_string(),
        Event::ItemForwarded { to, .. } => format!("pin sharpened, sent to {to}"),
        Event::ItemFinalized { .. } => "pin passed quality control".to_string(),
        Event::WorkerStopped { .. } => "stopped".to_string(),
        Event::WorkerFailed { error, .. } => format!("failed: {error}"),
        Event::CountsSnapshot { counts } => format!("counts {counts}"),
        Event::PipelineStopped {
            counts,
            discarded,
            finalized,
            ..
        } => format!(
            "pipeline stopped, counts {counts}, {discarded} discarded, {finalized} finished"
        ),
    }
}

fn worker_tag(worker: WorkerId) -> ColoredString {
    let tag = format!("[{worker}]");
    match worker.stage {
        Stage::Inspection => tag.yellow(),
        Stage::Sharpening => tag.cyan(),
        Stage::QualityControl => tag.green(),
    }
}

fn format_text(event: &Event) -> String {
    let text = describe(event);
    let text = match event {
        Event::ItemDiscarded { .. } | Event::WorkerFailed { .. } => text.red(),
        Event::DelayCompleted { .. } | Event::StageEmpty { .. } => text.dimmed(),
        _ => text.normal(),
    };
    match event.worker() {
        Some(worker) => format!("{} {text}", worker_tag(worker)),
        None => format!("{} {text}", "[pipeline]".bold()),
    }
}

/// Render one event as an output line.
pub fn format_event(event: &Event, json: bool) -> String {
    if json {
        serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    } else {
        format_text(event)
    }
}

/// Print events until every sender is gone.
pub async fn print_events(mut events_rx: UnboundedReceiver<Event>, json: bool) {
    while let Some(event) = events_rx.recv().await {
        println!("{}", format_event(&event, json));
    }
}

/// Print the end-of-run summary.
pub fn print_summary(report: &ShutdownReport, json: bool) -> color_eyre::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    let stats = &report.stats;
    println!("{}", "Summary".bold());
    println!("  run:        {}", report.run_id);
    println!("  stopped by: {:?}", report.reason);
    println!("  started:    {}", report.initial);
    println!("  final:      {}", report.counts);
    println!("  discarded:  {}", stats.discarded);
    println!("  finished:   {}", stats.finalized);
    println!(
        "  workers:    {} stopped of {}",
        report.stopped_workers(),
        report.exits.len()
    );
    for error in &report.release_errors {
        println!("  {} {error}", "release error:".red());
    }
    Ok(())
}
