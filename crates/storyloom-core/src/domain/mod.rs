//! Pure domain types.

mod playback;
mod turn;

pub use playback::{
    HandleId, PlaybackEvent, PlaybackEventKind, PlaybackHooks, PlaybackState, PlaybackStatus,
    ReleaseToken,
};
pub use turn::{Turn, TurnKind, count_words};
