//! Speech synthesis port.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Encoded audio returned by the synthesis service (typically `audio/mpeg`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl AudioPayload {
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Why synthesis did not produce audio. Never fatal to a session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("Speech synthesis returned status {status}")]
    Status { status: u16 },

    #[error("Speech synthesis network error: {0}")]
    Network(String),

    #[error("Speech synthesis returned an empty payload")]
    EmptyPayload,
}

/// Converts finished text into an encoded audio payload.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError>;
}
