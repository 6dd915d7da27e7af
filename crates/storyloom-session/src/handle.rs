//! The exclusive, releasable narration resource for one story turn.

use std::fmt;

use storyloom_core::{HandleId, MediaSource, PlaybackError, PlaybackHooks, ReleaseToken};

/// A prepared narration, owned by the session controller.
///
/// Releasing detaches the event hooks first, then stops and frees the media
/// source. A handle is released at most once: [`release`](Self::release)
/// consumes it, and dropping an unreleased handle releases it with a
/// warning.
pub struct AudioHandle {
    id: HandleId,
    media: Option<Box<dyn MediaSource>>,
    hooks: PlaybackHooks,
    release_token: ReleaseToken,
    duration: Option<f64>,
    word_count: usize,
    owner_turn: usize,
}

impl AudioHandle {
    pub(crate) fn new(
        media: Box<dyn MediaSource>,
        hooks: PlaybackHooks,
        word_count: usize,
        owner_turn: usize,
    ) -> Self {
        let release_token = media.release_token().clone();
        Self {
            id: hooks.handle(),
            media: Some(media),
            hooks,
            release_token,
            duration: None,
            word_count,
            owner_turn,
        }
    }

    #[must_use]
    pub const fn id(&self) -> HandleId {
        self.id
    }

    #[must_use]
    pub const fn release_token(&self) -> &ReleaseToken {
        &self.release_token
    }

    /// Duration in seconds, or `None` if it never became known.
    #[must_use]
    pub const fn duration(&self) -> Option<f64> {
        self.duration
    }

    #[must_use]
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Index of the turn this narration belongs to.
    #[must_use]
    pub const fn owner_turn(&self) -> usize {
        self.owner_turn
    }

    /// Re-read the duration from the source, keeping only usable values.
    pub(crate) fn refresh_duration(&mut self) -> Option<f64> {
        self.duration = self
            .media
            .as_ref()
            .and_then(|m| m.duration())
            .filter(|d| d.is_finite() && *d > 0.0);
        self.duration
    }

    pub(crate) async fn play(&mut self) -> Result<(), PlaybackError> {
        match self.media.as_mut() {
            Some(media) => media.play().await,
            None => Err(PlaybackError::Released),
        }
    }

    pub(crate) fn pause(&mut self) -> Result<(), PlaybackError> {
        match self.media.as_mut() {
            Some(media) => media.pause(),
            None => Err(PlaybackError::Released),
        }
    }

    /// Stop and free the media source.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) -> bool {
        let Some(mut media) = self.media.take() else {
            return false;
        };
        self.hooks.detach();
        media.stop();
        media.release();
        tracing::debug!(handle = %self.id, token = %self.release_token, "Released audio handle");
        true
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        if self.media.is_some() {
            tracing::warn!(
                handle = %self.id,
                "Audio handle dropped without release; releasing now"
            );
            self.release_inner();
        }
    }
}

impl fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioHandle")
            .field("id", &self.id)
            .field("release_token", &self.release_token)
            .field("duration", &self.duration)
            .field("word_count", &self.word_count)
            .field("owner_turn", &self.owner_turn)
            .field("released", &self.media.is_none())
            .finish()
    }
}
