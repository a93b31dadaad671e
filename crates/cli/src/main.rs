//! `pinline`: runs the pin pipeline until Ctrl-C (or `--duration-ms`).

mod args;
mod logging;
mod render;

use args::Args;
use clap::Parser;
use pl_core::PipelineSupervisor;
use pl_protocol::ipc::Op;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::init(args.verbose)?;

    let config = args.load_config()?;
    info!(?config, "configuration loaded");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut supervisor = PipelineSupervisor::builder(config)
        .events(events_tx)
        .start()?;
    let printer = tokio::spawn(render::print_events(events_rx, args.json));

    let (ops_tx, ops_rx) = mpsc::unbounded_channel();
    if let Some(interval) = args.snapshot_interval() {
        tokio::spawn(request_snapshots(ops_tx, interval));
    } else {
        drop(ops_tx);
    }

    let report = supervisor.run(ops_rx, shutdown_signal(args.duration())).await;

    // Dropping the supervisor closes the last event sender, which ends the printer.
    drop(supervisor);
    printer.await?;

    render::print_summary(&report, args.json)?;
    Ok(())
}

async fn request_snapshots(ops_tx: mpsc::UnboundedSender<Op>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if ops_tx.send(Op::Snapshot).is_err() {
            break;
        }
    }
}

/// Resolves on Ctrl-C, or after `duration` if one is given.
async fn shutdown_signal(duration: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("interrupt received");
    };

    match duration {
        Some(duration) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = tokio::time::sleep(duration) => info!(?duration, "run duration elapsed"),
            }
        }
        None => ctrl_c.await,
    }
}
