//! Internal error types for story service operations.
//!
//! These errors are internal to `storyloom-remote` and are mapped to core
//! port errors at the boundary.

use storyloom_core::{StoreError, StreamError, SynthesisError};
use thiserror::Error;

/// Result type alias for story service operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors related to story service requests.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with an HTTP error status.
    #[error("Story service request failed with status {status}: {url}")]
    RequestFailed {
        status: u16,
        url: String,
        /// Response body, truncated, for diagnostics.
        message: String,
    },

    /// The service returned an unexpected payload.
    #[error("Invalid response from story service: {message}")]
    InvalidResponse { message: String },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<RemoteError> for StreamError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::RequestFailed {
                status, message, ..
            } => Self::Status { status, message },
            RemoteError::InvalidResponse { message } => Self::Protocol(message),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<RemoteError> for SynthesisError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::RequestFailed { status, .. } => Self::Status { status },
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<RemoteError> for StoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::RequestFailed { status, .. } => Self::Status { status },
            RemoteError::InvalidResponse { message } => Self::InvalidResponse(message),
            other => Self::Network(other.to_string()),
        }
    }
}
