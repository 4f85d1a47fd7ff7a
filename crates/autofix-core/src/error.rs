//! Domain-level error taxonomy for autofix planning.

/// Errors produced by findings ingestion and batch planning.
#[derive(Debug, thiserror::Error)]
pub enum AutofixError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("planning error: {0}")]
    Planning(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for autofix domain operations.
pub type Result<T> = std::result::Result<T, AutofixError>;
