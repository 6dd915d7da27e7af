//! Session state and the events published to the presentation layer.

use serde::{Deserialize, Serialize};
use storyloom_core::{PlaybackState, Turn};

use crate::sync::Highlight;

// ── Session state machine ──────────────────────────────────────────

/// Where the session is in the generate → prepare → reveal cycle.
///
/// Story completion (all improvisations used) is tracked separately and can
/// coincide with any of the resting states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Nothing has been requested yet.
    #[default]
    Idle,

    /// Waiting on the generation stream.
    Generating,

    /// Text is final; narration is being prepared. Text is not yet visible.
    PreparingAudio,

    /// The newest story turn is revealed and its narration is playing.
    Playing,

    /// The newest story turn is revealed, but has no narration.
    RevealedWithoutAudio,

    Paused,

    /// Narration finished or failed, or generation failed.
    Ended,

    /// Torn down. Terminal.
    Aborted,
}

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted by the session controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SessionState),

    /// Live accumulated text of the generation in flight. Not final.
    TextProgress(String),

    /// A turn became visible.
    TurnAppended(Turn),

    /// The highlighted word changed. `word: None` clears the highlight.
    Highlight(Highlight),

    PlaybackChanged(PlaybackState),

    /// The improvisation limit was reached; no further improvisations.
    Completed,

    /// A user-facing failure (generation or story loading).
    Error(String),
}
