//! Command-line arguments.

use clap::{ArgAction, Parser};
use pl_core::config::error::ConfigResult;
use pl_core::config::loader::resolve_config;
use pl_core::config::models::ConfigOverrides;
use pl_protocol::config_models::PipelineConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Run the three-stage pin pipeline until interrupted.
#[derive(Parser, Debug)]
#[command(name = "pinline", version, about)]
pub struct Args {
    /// Configuration file. Defaults to `.pinline/config.toml` if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Workers at the inspection stage.
    #[arg(long, value_name = "N")]
    pub inspectors: Option<usize>,

    /// Workers at the sharpening stage.
    #[arg(long, value_name = "N")]
    pub sharpeners: Option<usize>,

    /// Workers at the quality control stage.
    #[arg(long, value_name = "N")]
    pub controllers: Option<usize>,

    /// Pins waiting for inspection at startup.
    #[arg(long, value_name = "N")]
    pub inventory: Option<u64>,

    /// Shortest simulated work delay.
    #[arg(long, value_name = "MS")]
    pub min_delay_ms: Option<u64>,

    /// Longest simulated work delay.
    #[arg(long, value_name = "MS")]
    pub max_delay_ms: Option<u64>,

    /// Seed for a reproducible run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop on its own after this long instead of waiting for Ctrl-C.
    #[arg(long, value_name = "MS")]
    pub duration_ms: Option<u64>,

    /// Print the stage counters at this interval.
    #[arg(long, value_name = "MS")]
    pub snapshot_every_ms: Option<u64>,

    /// Print events and the summary as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// More diagnostics on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            inspectors: self.inspectors,
            sharpeners: self.sharpeners,
            controllers: self.controllers,
            initial_inventory: self.inventory,
            min_delay_ms: self.min_delay_ms,
            max_delay_ms: self.max_delay_ms,
            seed: self.seed,
        }
    }

    /// File (or defaults) with command-line overrides applied, validated.
    pub fn load_config(&self) -> ConfigResult<PipelineConfig> {
        resolve_config(Path::new("."), self.config.as_deref(), self.overrides())
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    pub fn snapshot_interval(&self) -> Option<Duration> {
        self.snapshot_every_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}
