//! Pipeline configuration models for `.pinline/config.toml`.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! classic setup: 3 inspectors, 5 sharpeners, 2 quality controllers and 10
//! pins waiting for inspection.

use crate::stage_models::{Stage, StageCounts};
use serde::Deserialize;
use serde::Serialize;

/// Number of workers assigned to each stage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct StageWorkers {
    pub inspection: usize,
    pub sharpening: usize,
    pub quality_control: usize,
}

impl StageWorkers {
    pub fn new(inspection: usize, sharpening: usize, quality_control: usize) -> Self {
        Self {
            inspection,
            sharpening,
            quality_control,
        }
    }

    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Inspection => self.inspection,
            Stage::Sharpening => self.sharpening,
            Stage::QualityControl => self.quality_control,
        }
    }

    /// Workers across all stages, saturating at `usize::MAX`.
    pub fn total(&self) -> usize {
        self.inspection
            .saturating_add(self.sharpening)
            .saturating_add(self.quality_control)
    }

    /// Workers across all stages, or `None` if the sum overflows.
    pub fn checked_total(&self) -> Option<usize> {
        self.inspection
            .checked_add(self.sharpening)?
            .checked_add(self.quality_control)
    }
}

impl Default for StageWorkers {
    fn default() -> Self {
        Self::new(3, 5, 2)
    }
}

/// Range of the simulated work delay, in milliseconds (inclusive).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(1000, 3000)
    }
}

/// Startup parameters of a pipeline run.
///
/// # Example
///
/// ```toml
/// # .pinline/config.toml
/// initial-inventory = 10
/// seed = 42
///
/// [workers]
/// inspection = 3
/// sharpening = 5
/// quality-control = 2
///
/// [delay]
/// min-ms = 1000
/// max-ms = 3000
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct PipelineConfig {
    /// Workers per stage.
    pub workers: StageWorkers,

    /// Pins waiting at the inspection stage when the run starts.
    pub initial_inventory: u64,

    /// Per-iteration work delay of every worker.
    pub delay: DelayRange,

    /// Seed for reproducible runs. Worker rngs are seeded from the OS when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Counters the shared state starts with.
    pub fn initial_counts(&self) -> StageCounts {
        StageCounts::new(self.initial_inventory, 0, 0)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: StageWorkers::default(),
            initial_inventory: 10,
            delay: DelayRange::default(),
            seed: None,
        }
    }
}
