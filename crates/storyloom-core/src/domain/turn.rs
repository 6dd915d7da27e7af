//! Narrative turns: the unit of exchange between the user and the generator.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnKind {
    /// An improvisation typed (or spoken) by the user.
    User,
    /// A story segment produced by the generator.
    Story,
}

/// One appended turn of the story.
///
/// Turns are immutable once constructed. Only the turn sequencer in
/// `storyloom-session` creates them, assigning `index` at append time so the
/// indices of a session always form the gapless sequence `0, 1, 2, …`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    index: usize,
    kind: TurnKind,
    text: String,
    word_count: usize,
    narrated: bool,
}

impl Turn {
    /// Build a turn. `word_count` is derived from `text`.
    #[must_use]
    pub fn new(index: usize, kind: TurnKind, text: impl Into<String>, narrated: bool) -> Self {
        let text = text.into();
        let word_count = count_words(&text);
        Self {
            index,
            kind,
            text,
            word_count,
            narrated,
        }
    }

    /// Ordinal position within the session (0-based).
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn kind(&self) -> TurnKind {
        self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of whitespace-separated words in [`text`](Self::text).
    #[must_use]
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Whether narration audio was ready when the turn was revealed.
    ///
    /// Always `false` for user turns.
    #[must_use]
    pub const fn narrated(&self) -> bool {
        self.narrated
    }

    /// The `n`th word of the turn, if any.
    #[must_use]
    pub fn word(&self, n: usize) -> Option<&str> {
        self.text.split_whitespace().nth(n)
    }
}

/// Count words the same way highlighting does: split on any whitespace.
#[must_use]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_is_derived_from_text() {
        let turn = Turn::new(0, TurnKind::Story, "  The  fox\tjumped\nover ", true);
        assert_eq!(turn.word_count(), 4);
        assert_eq!(turn.word(1), Some("fox"));
        assert_eq!(turn.word(4), None);
    }

    #[test]
    fn empty_text_has_no_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n"), 0);
    }

    #[test]
    fn turn_serializes_camel_case() {
        let turn = Turn::new(2, TurnKind::User, "a dragon", false);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["index"], 2);
        assert_eq!(json["kind"], "user");
        assert_eq!(json["wordCount"], 2);
    }
}
