//! Narration preparation: synthesize, open, wait briefly for duration.

use std::sync::Arc;
use std::time::Duration;

use storyloom_core::{MediaPlayer, PlaybackHooks, SpeechSynthesizer, SynthesisError, count_words};
use tracing::{debug, warn};

use crate::error::PrepareFailure;
use crate::handle::AudioHandle;

/// Produces ready-to-play [`AudioHandle`]s for finished text.
#[derive(Clone)]
pub struct AudioPreparer {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn MediaPlayer>,
    duration_wait: Duration,
}

impl AudioPreparer {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn MediaPlayer>,
        duration_wait: Duration,
    ) -> Self {
        Self {
            synthesizer,
            player,
            duration_wait,
        }
    }

    /// Synthesize `text` and open it for playback.
    ///
    /// Resolves only once the handle is fully ready or narration is known to
    /// be unavailable. If the duration is not known right after opening, the
    /// preparer waits once for `duration_wait` and then settles for an
    /// unknown duration. The handle is owned as soon as the source is open,
    /// so dropping this future mid-wait still releases it.
    pub async fn prepare(
        &self,
        text: &str,
        hooks: PlaybackHooks,
        owner_turn: usize,
    ) -> Result<AudioHandle, PrepareFailure> {
        let id = hooks.handle();
        let payload = self.synthesizer.synthesize(text).await?;
        if payload.is_empty() {
            return Err(SynthesisError::EmptyPayload.into());
        }
        debug!(handle = %id, bytes = payload.len(), "Synthesized narration");

        let source = self.player.open(payload, hooks.clone()).await?;
        let mut handle = AudioHandle::new(source, hooks, count_words(text), owner_turn);

        if handle.refresh_duration().is_none() && !self.duration_wait.is_zero() {
            tokio::time::sleep(self.duration_wait).await;
            if handle.refresh_duration().is_none() {
                warn!(
                    handle = %id,
                    "Narration duration unknown; highlighting disabled for this turn"
                );
            }
        }

        Ok(handle)
    }
}
