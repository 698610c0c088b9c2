//! Error types for the evaluation pipeline
//!
//! Taxonomy:
//! - `TestNotFound` — fatal for the run, no side effects committed
//! - `Scoring` — a similarity backend exhausted its retries; fatal
//!   mid-run (already-persisted response records are tolerated)
//! - `Store` — a backing-store write or read failed; fatal
//! - `Validation` — malformed run request; rejected up front
//! - `Config` — missing or invalid environment configuration
//!
//! Feedback-generation and delivery failures are deliberately absent:
//! both are best-effort and never surface as run errors.

use crate::workflow::RunState;
use gradeflow_inference::ServiceError;

/// Fatal evaluation-run failure.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Unknown test id
    #[error("test not found: {0}")]
    TestNotFound(String),

    /// Similarity scoring failed after retries
    #[error("scoring failed: {0}")]
    Scoring(#[from] ServiceError),

    /// Backing store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Malformed run request
    #[error("invalid run request: {0}")]
    Validation(String),

    /// Configuration failure
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Workflow attempted an illegal state transition
    #[error("illegal workflow transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// State the run was in
        from: RunState,
        /// State the run tried to enter
        to: RunState,
    },
}

/// Backing-store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store unreachable or rejected the connection
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Environment configuration failure; surfaced at startup, fail fast.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required variable absent
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// Variable present but unusable
    #[error("invalid value for {name}: {value}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}
