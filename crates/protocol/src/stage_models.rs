//! Stage models.
//!
//! A pin moves through three stages: it is inspected for defects, sharpened,
//! and finally passes quality control. Each stage has a counter holding the
//! number of pins waiting there.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three stages of the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Stage 1: pins are checked for defects. Roughly half are discarded.
    Inspection,

    /// Stage 2: every pin that reaches this stage is sharpened and forwarded.
    Sharpening,

    /// Stage 3: terminal stage, pins leave the system from here.
    QualityControl,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 3] = [Stage::Inspection, Stage::Sharpening, Stage::QualityControl];

    /// 1-based stage number.
    pub fn number(self) -> u8 {
        match self {
            Stage::Inspection => 1,
            Stage::Sharpening => 2,
            Stage::QualityControl => 3,
        }
    }

    /// Zero-based index, usable for per-stage arrays.
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    /// The stage that receives items from this one, if any.
    pub fn downstream(self) -> Option<Stage> {
        match self {
            Stage::Inspection => Some(Stage::Sharpening),
            Stage::Sharpening => Some(Stage::QualityControl),
            Stage::QualityControl => None,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Inspection => "inspection",
            Stage::Sharpening => "sharpening",
            Stage::QualityControl => "quality-control",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Point-in-time values of the three stage counters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub inspection: u64,
    pub sharpening: u64,
    pub quality_control: u64,
}

impl StageCounts {
    pub fn new(inspection: u64, sharpening: u64, quality_control: u64) -> Self {
        Self {
            inspection,
            sharpening,
            quality_control,
        }
    }

    pub fn get(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Inspection => self.inspection,
            Stage::Sharpening => self.sharpening,
            Stage::QualityControl => self.quality_control,
        }
    }

    pub fn set(&mut self, stage: Stage, value: u64) {
        match stage {
            Stage::Inspection => self.inspection = value,
            Stage::Sharpening => self.sharpening = value,
            Stage::QualityControl => self.quality_control = value,
        }
    }

    /// Number of items currently waiting anywhere in the pipeline.
    pub fn total(&self) -> u64 {
        self.inspection + self.sharpening + self.quality_control
    }
}

impl fmt::Display for StageCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.inspection, self.sharpening, self.quality_control
        )
    }
}
