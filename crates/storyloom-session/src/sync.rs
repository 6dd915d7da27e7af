//! Word highlighting driven by live playback position.

use storyloom_core::HandleId;

use crate::handle::AudioHandle;

/// Map a playback position onto a word of the narrated text.
///
/// `floor(position / duration * word_count)`, clamped to
/// `[0, word_count - 1]`. Returns `None` (highlighting disabled) when the
/// duration is unknown, non-finite or not positive, when there are no words,
/// or when the position itself is not a finite number.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn highlight_index(position: f64, duration: Option<f64>, word_count: usize) -> Option<usize> {
    let duration = duration.filter(|d| d.is_finite() && *d > 0.0)?;
    if word_count == 0 || !position.is_finite() {
        return None;
    }
    let ratio = (position / duration).max(0.0);
    // float -> usize casts saturate
    let index = (ratio * word_count as f64).floor() as usize;
    Some(index.min(word_count - 1))
}

/// Highlight of a single turn. `word: None` means nothing is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub turn: usize,
    pub word: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    handle: HandleId,
    turn: usize,
    duration: Option<f64>,
    word_count: usize,
}

/// Tracks the highlighted word of the one turn whose narration is live.
///
/// Only events from the bound handle move the highlight. While frozen
/// (paused) the last index is kept; [`clear`](Self::clear) drops it.
#[derive(Debug, Default)]
pub struct PlaybackSynchronizer {
    binding: Option<Binding>,
    word: Option<usize>,
    frozen: bool,
}

impl PlaybackSynchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `handle`. Replaces any previous binding.
    pub fn bind(&mut self, handle: &AudioHandle) {
        if handle.duration().is_none() {
            tracing::debug!(
                handle = %handle.id(),
                turn = handle.owner_turn(),
                "Duration unknown; highlighting disabled"
            );
        }
        self.binding = Some(Binding {
            handle: handle.id(),
            turn: handle.owner_turn(),
            duration: handle.duration(),
            word_count: handle.word_count(),
        });
        self.word = None;
        self.frozen = false;
    }

    /// Feed a position update. Returns the new highlight only if it changed.
    pub fn on_position(&mut self, handle: HandleId, position: f64) -> Option<Highlight> {
        let binding = self.binding.filter(|b| b.handle == handle)?;
        if self.frozen {
            return None;
        }
        let word = highlight_index(position, binding.duration, binding.word_count)?;
        if self.word == Some(word) {
            return None;
        }
        self.word = Some(word);
        Some(Highlight {
            turn: binding.turn,
            word: Some(word),
        })
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn thaw(&mut self) {
        self.frozen = false;
    }

    /// Unbind. Returns a clearing highlight if a word was highlighted.
    pub fn clear(&mut self) -> Option<Highlight> {
        let binding = self.binding.take()?;
        self.frozen = false;
        self.word.take().map(|_| Highlight {
            turn: binding.turn,
            word: None,
        })
    }

    /// The current highlight, if any.
    #[must_use]
    pub fn current(&self) -> Option<Highlight> {
        let binding = self.binding?;
        self.word.map(|word| Highlight {
            turn: binding.turn,
            word: Some(word),
        })
    }
}
