//! Common test utilities for pipeline integration tests.
//!
//! - Fixtures: configurations and started supervisors
//! - Assertions: accounting checks over shutdown reports and event streams

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
