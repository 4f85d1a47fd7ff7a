//! Engine-level error taxonomy.
//!
//! Session-level remote failures are recorded as data (a terminal session
//! state with a reason), never surfaced as errors; target-level ingest and
//! planning failures are recorded in the target's result. The variants
//! here cover the remaining cases: configuration problems discovered
//! before dispatch, and programming-invariant violations.

use autofix_core::{AutofixError, SessionState};

/// Autofix engine errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no targets to process")]
    NoTargets,

    #[error("invalid session state transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },

    #[error("aggregation error: {0}")]
    Aggregation(String),

    #[error("domain error: {0}")]
    Core(#[from] AutofixError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
