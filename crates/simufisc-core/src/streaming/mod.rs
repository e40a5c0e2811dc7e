//! Streaming primitives for progress delivery.

pub mod channel;
pub mod control;

pub use channel::*;
pub use control::*;
