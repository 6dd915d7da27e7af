//! Ordered turn history and the improvisation counter.

use storyloom_core::{MAX_IMPROVISATIONS, Turn, TurnKind};

use crate::error::SequencerError;

/// Whether narration was ready when a story turn was revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOutcome {
    Ready,
    Unavailable,
}

/// What produced a story turn. Only continuations consume an improvisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryOrigin {
    Opening,
    Continuation,
}

/// Owns the turns of one story.
///
/// Indices are assigned at append time from the current length, so
/// `turns()[i].index() == i` always holds. The improvisation counter only
/// moves when a continuation story turn is appended: a user turn whose
/// continuation never arrives stays in the history but costs nothing.
#[derive(Debug, Clone)]
pub struct TurnSequencer {
    turns: Vec<Turn>,
    improvisations: u8,
    max_improvisations: u8,
}

impl Default for TurnSequencer {
    fn default() -> Self {
        Self::new(MAX_IMPROVISATIONS)
    }
}

impl TurnSequencer {
    #[must_use]
    pub const fn new(max_improvisations: u8) -> Self {
        Self {
            turns: Vec::new(),
            improvisations: 0,
            max_improvisations,
        }
    }

    /// Fails once the improvisation counter is exhausted.
    pub const fn ensure_can_improvise(&self) -> Result<(), SequencerError> {
        if self.is_exhausted() {
            return Err(SequencerError::LimitExceeded {
                max: self.max_improvisations,
            });
        }
        Ok(())
    }

    /// Append a user improvisation. Not gated on audio, does not count.
    pub fn append_user_turn(&mut self, text: &str) -> Result<usize, SequencerError> {
        self.ensure_can_improvise()?;
        Ok(self.push(TurnKind::User, text, false))
    }

    /// Append a story turn once its audio outcome is known and return the
    /// assigned index.
    pub fn append_story_turn(
        &mut self,
        text: &str,
        audio: AudioOutcome,
        origin: StoryOrigin,
    ) -> usize {
        let index = self.push(TurnKind::Story, text, audio == AudioOutcome::Ready);
        if origin == StoryOrigin::Continuation && !self.is_exhausted() {
            self.improvisations += 1;
        }
        index
    }

    /// Replace the history with a previously saved story.
    ///
    /// `improvisations_used` is clamped to the limit.
    pub fn seed(&mut self, text: &str, improvisations_used: u8) -> usize {
        self.reset();
        self.improvisations = improvisations_used.min(self.max_improvisations);
        self.push(TurnKind::Story, text, false)
    }

    /// Clear all turns. Only used for a brand-new story.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.improvisations = 0;
    }

    fn push(&mut self, kind: TurnKind, text: &str, narrated: bool) -> usize {
        let index = self.turns.len();
        self.turns.push(Turn::new(index, kind, text, narrated));
        index
    }

    /// Index the next appended turn will receive.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn turn(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    #[must_use]
    pub fn has_story(&self) -> bool {
        self.turns.iter().any(|t| t.kind() == TurnKind::Story)
    }

    #[must_use]
    pub const fn improvisations(&self) -> u8 {
        self.improvisations
    }

    #[must_use]
    pub const fn max_improvisations(&self) -> u8 {
        self.max_improvisations
    }

    #[must_use]
    pub const fn remaining(&self) -> u8 {
        self.max_improvisations.saturating_sub(self.improvisations)
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.improvisations >= self.max_improvisations
    }
}
