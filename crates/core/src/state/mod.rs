//! Shared pipeline state.
//!
//! This module provides:
//! - `SharedState`: the three stage counters, each behind its own `StageGuard`
//! - `PipelineStats`: tallies of every transfer, used to account for items

pub mod error;
pub mod shared;
pub mod stats;

pub use error::{StateError, StateResult};
pub use shared::{ReleaseReport, SharedState, StageGuard};
pub use stats::{PipelineStats, StatsSnapshot};
