//! Configuration loading and management.
//!
//! This module loads the pipeline configuration from `.pinline/config.toml`
//! (or an explicit path), applies command-line overrides and validates the
//! result.

pub mod error;
pub mod loader;
pub mod models;
