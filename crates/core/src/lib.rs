//! # pl-core
//!
//! Concurrent three-stage pin pipeline for pinline.
//!
//! Pins wait at three stages (inspection, sharpening, quality control).
//! A pool of workers per stage repeatedly takes one pin from its stage's
//! counter and hands it on. The counters are the only thing workers share.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading, overrides and validation
//! - [`state`]: Shared stage counters, their guards, and transfer statistics
//! - [`worker`]: The per-worker delay/take/transfer loop
//! - [`supervisor`]: Startup, supervision and teardown of a run
//! - [`events`]: Delivery of pipeline events to a front end

pub mod config;
pub mod events;
pub mod state;
pub mod supervisor;
pub mod worker;

pub use events::EventSink;
pub use supervisor::report::{ShutdownReport, StopReason};
pub use supervisor::PipelineSupervisor;
