//! Voice capture port, a producer of finalized transcripts.
//!
//! The engine treats speech input purely as another way to fill the theme
//! or improvisation field. Microphone permissions and engine selection are
//! the implementation's concern.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Voice capture is not supported on this system")]
    Unsupported,

    #[error("Voice capture failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait VoiceCapture: Send {
    /// Whether this capture implementation can run at all.
    fn supported(&self) -> bool;

    /// Begin listening.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop listening and return the finalized transcript, if any speech
    /// was recognised.
    async fn stop(&mut self) -> Result<Option<String>, CaptureError>;
}

/// Capture for systems without speech recognition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVoiceCapture;

#[async_trait]
impl VoiceCapture for NoopVoiceCapture {
    fn supported(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported)
    }

    async fn stop(&mut self) -> Result<Option<String>, CaptureError> {
        Ok(None)
    }
}
