//! Shared test utilities: fixtures, recording sinks, assertion macros.

pub mod assertions;
pub mod fixtures;
pub mod logging;
pub mod sinks;

pub use fixtures::*;
pub use logging::init_test_logging;
pub use sinks::*;
