//! Error types for the session engine.

use storyloom_core::{PlaybackError, StoreError, StreamError, SynthesisError};
use thiserror::Error;

use crate::events::SessionState;

/// Errors returned by [`SessionController`](crate::SessionController)
/// operations.
///
/// Synthesis and playback failures never appear here: they are recovered
/// inside the session and only show up as degraded state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Generation failed; no story turn was produced.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// An existing story could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("This story already used all {max} improvisations")]
    ImprovisationLimitExceeded { max: u8 },

    #[error("Theme cannot be empty")]
    EmptyTheme,

    #[error("Improvisation cannot be empty")]
    EmptyImprovisation,

    #[error("No story has been generated yet")]
    NotStarted,

    #[error("Cannot {operation} while the session is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The session was torn down while the operation was in flight.
    #[error("Session aborted")]
    Aborted,
}

/// Why narration for a turn is unavailable. Recovered by revealing the
/// text without audio.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrepareFailure {
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("media could not be opened: {0}")]
    Media(#[from] PlaybackError),
}

/// Rejections from the [`TurnSequencer`](crate::TurnSequencer).
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("Improvisation limit of {max} reached")]
    LimitExceeded { max: u8 },
}

impl From<SequencerError> for SessionError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::LimitExceeded { max } => Self::ImprovisationLimitExceeded { max },
        }
    }
}
