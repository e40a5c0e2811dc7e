//! # simufisc-core
//!
//! Domain models, calendar arithmetic, and streaming primitives for the
//! simufisc financial projection engine:
//! - Account, pattern, occurrence, and result models with decimal money
//! - French national and regional holiday calendar (Easter computus included)
//!   with a bounded process-wide memo cache
//! - Date kernel: ISO formatting, fiscal-month mapping, weekday helpers
//! - Store and sink traits decoupling the engine from persistence
//! - Bounded channel with drop-oldest coalescing for progress delivery

pub mod calendar;
pub mod error;
pub mod models;
pub mod streaming;
pub mod traits;

pub use error::*;
pub use models::*;
