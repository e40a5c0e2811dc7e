//! Error types for the simulation engine.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Account;

/// Main error type for simulation operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed input: out-of-range year, unknown VAT rate, missing
    /// required fields, pattern count limit. Reported verbatim, no retry.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced company or pattern disappeared mid-run.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The aggregator failed a balance invariant. Implies an engine bug.
    #[error(
        "Invariant {invariant} violated for account {account}: {left} != {right} (delta {delta})"
    )]
    InvariantViolation {
        invariant: &'static str,
        account: Account,
        left: Decimal,
        right: Decimal,
        delta: Decimal,
    },

    /// The cancellation signal fired.
    #[error("Simulation cancelled")]
    Cancelled,

    /// Unexpected failure from a collaborator (e.g. a sink rejected a write).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error for a missing company or pattern.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create an invariant violation carrying both sides of the comparison.
    pub fn invariant(
        invariant: &'static str,
        account: Account,
        left: Decimal,
        right: Decimal,
    ) -> Self {
        Self::InvariantViolation {
            invariant,
            account,
            left,
            right,
            delta: left - right,
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error stems from caller input rather than the engine.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }

    /// Check if this error implies an engine bug.
    pub fn is_engine_bug(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}

/// Result type alias for simulation operations.
pub type EngineResult<T> = Result<T, EngineError>;
