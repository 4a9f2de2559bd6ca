//! Typed outcomes returned at component boundaries.
//!
//! Internals use `anyhow` with context; these enums are what callers of the
//! store, the ingestion path and the forecaster actually match on.

use thiserror::Error;

/// Failure of the record store. Never retried by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persistence layer unreachable, a read/write failed, or the caller's
    /// timeout elapsed before the worker answered.
    #[error("record store unavailable: {0:#}")]
    Unavailable(anyhow::Error),
}

/// Why a forecast could not be fitted. A normal outcome, not a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsufficientData {
    #[error("insufficient data: need at least {required} readings with humidity, got {actual}")]
    TooFewReadings { required: usize, actual: usize },

    #[error("insufficient data: every reading shares the same timestamp")]
    ZeroTimeSpread,
}

/// Failure of a single ingestion call.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
