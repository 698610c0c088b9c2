//! Error types for remote service calls
//!
//! A single `ServiceError` covers every way a remote inference or
//! completion call can fail: transport-level failures, non-success
//! statuses that survived the retry schedule, and responses whose
//! shape matched none of the negotiated formats.

/// Remote service call failure
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// HTTP client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    /// Transport-level failure (connect, timeout, body decode)
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Endpoint that was called
        endpoint: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status after exhausting the retry schedule
    #[error("{endpoint} returned status {status} after {attempts} attempts: {body}")]
    Status {
        /// Endpoint that was called
        endpoint: String,
        /// Last HTTP status observed
        status: u16,
        /// Last response body observed
        body: String,
        /// Total attempts made (initial call plus retries)
        attempts: usize,
    },

    /// Response parsed as JSON but matched no known shape
    #[error("unrecognized response shape from {endpoint}: {snippet}")]
    UnrecognizedShape {
        /// Endpoint that was called
        endpoint: String,
        /// Truncated body for diagnostics
        snippet: String,
    },
}

impl ServiceError {
    /// Whether the failure was a service-side outage rather than a
    /// malformed-response condition.
    #[inline]
    #[must_use]
    pub fn is_outage(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}
