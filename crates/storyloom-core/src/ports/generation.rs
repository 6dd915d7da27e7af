//! Incremental story generation port.
//!
//! The transport only opens the response body; parsing the record protocol
//! (deltas, completion record, malformed framing) is the session engine's
//! job. This keeps the adapter free of protocol rules and lets the engine be
//! tested against scripted byte streams.

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::stream::BoxStream;
use thiserror::Error;

/// A request for new story text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    /// Begin a brand-new story.
    Opening {
        theme: String,
        prior_improvisations: Vec<String>,
        session_id: String,
    },
    /// Continue an existing story with the user's improvisation.
    Continuation {
        session_id: String,
        improvisation: String,
    },
}

impl GenerationRequest {
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::Opening { session_id, .. } | Self::Continuation { session_id, .. } => session_id,
        }
    }

    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        matches!(self, Self::Continuation { .. })
    }
}

/// Raw response body chunks, in arrival order. Finite and not restartable.
pub type TextByteStream = BoxStream<'static, Result<Bytes, StreamError>>;

/// Errors from opening or reading a generation stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The request could not be sent or a chunk could not be read.
    #[error("Story stream network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("Story service returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The connection closed before a completion record arrived.
    #[error("Story stream closed without a completion record")]
    Incomplete,

    /// The body could not be read as the record protocol at all.
    #[error("Story stream protocol error: {0}")]
    Protocol(String),
}

/// Opens incremental generation responses.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    /// Issue `request` and return the response body as a byte stream.
    async fn open(&self, request: &GenerationRequest) -> Result<TextByteStream, StreamError>;
}
