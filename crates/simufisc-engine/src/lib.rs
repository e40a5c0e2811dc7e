//! # simufisc-engine
//!
//! Deterministic financial simulation engine for French small-business
//! accounting. Given a fiscal configuration, recurring revenue and expense
//! patterns, and starting balances, one run produces a twelve-month
//! projection of per-account balances, monthly summaries, and overall
//! totals while streaming progress snapshots to subscribers.
//!
//! Pipeline: pattern expansion -> posting derivation -> ledger aggregation
//! (seed, apply, fiscal-ordered roll-forward, summaries) -> invariant
//! checking, orchestrated by [`SimulationRunner`].

pub mod expander;
pub mod invariants;
pub mod ledger;
pub mod postings;
pub mod progress;
pub mod runner;

pub use expander::PatternExpander;
pub use ledger::LedgerAggregator;
pub use progress::{
    HeartbeatHandle, ProgressBroadcaster, ProgressSubscription, DEFAULT_HEARTBEAT_INTERVAL,
};
pub use runner::{
    run_simulation, RunnerOptions, SimulationRunner, ENGINE_VERSION, MAX_PATTERNS, MAX_YEAR,
    MIN_YEAR,
};
