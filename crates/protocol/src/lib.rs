//! # pl-protocol
//!
//! Shared data models for pinline.
//!
//! This crate defines the structures exchanged between the pipeline core
//! and whatever drives it (the CLI, tests, other front ends):
//! - Stage identities and per-stage counter snapshots
//! - Worker identities
//! - Pipeline configuration as read from `config.toml`
//! - Events emitted while the pipeline runs, and operations sent to it
//!
//! ## Modules
//!
//! - [`stage_models`]: Stages and counter snapshots
//! - [`worker_models`]: Worker identity and status
//! - [`config_models`]: Pipeline configuration
//! - [`ipc`]: Operations and Events
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde and uuid
//! - Independent compilation: No dependencies on other pinline crates

pub mod config_models;
pub mod ipc;
pub mod stage_models;
pub mod worker_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use stage_models::*;
pub use worker_models::*;
