//! Narration playback via `rodio`.
//!
//! Each opened payload gets its own paused [`Sink`]. A watcher thread per
//! source polls the sink and reports live position and natural completion
//! through the session's [`PlaybackHooks`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use rodio::Sink;
use rodio::buffer::SamplesBuffer;
use storyloom_core::{
    AudioPayload, MediaPlayer, MediaSource, PlaybackError, PlaybackEventKind, PlaybackHooks,
    ReleaseToken, Settings,
};

use crate::decode::decode_payload;
use crate::error::VoiceError;
use crate::output_thread::OutputThread;

// ── Player ─────────────────────────────────────────────────────────

/// [`MediaPlayer`] backed by the default output device.
pub struct RodioMediaPlayer {
    output: Arc<OutputThread>,
    position_tick: Duration,
}

impl RodioMediaPlayer {
    /// Open the default output device.
    pub fn new(position_tick: Duration) -> Result<Self, VoiceError> {
        Ok(Self {
            output: Arc::new(OutputThread::spawn()?),
            position_tick,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, VoiceError> {
        Self::new(Duration::from_millis(settings.effective_position_tick_ms()))
    }
}

#[async_trait]
impl MediaPlayer for RodioMediaPlayer {
    async fn open(
        &self,
        payload: AudioPayload,
        hooks: PlaybackHooks,
    ) -> Result<Box<dyn MediaSource>, PlaybackError> {
        tracing::debug!(
            handle = %hooks.handle(),
            bytes = payload.len(),
            content_type = ?payload.content_type,
            "Decoding narration"
        );

        let bytes = payload.bytes;
        let decoded = tokio::task::spawn_blocking(move || decode_payload(bytes))
            .await
            .map_err(|e| PlaybackError::Decode(format!("decoder task failed: {e}")))??;
        let duration = decoded.duration();

        let sink = Sink::try_new(self.output.stream_handle())
            .map_err(|e| PlaybackError::from(VoiceError::OutputStreamError(e.to_string())))?;
        sink.pause();
        sink.append(SamplesBuffer::new(
            decoded.channels,
            decoded.sample_rate,
            decoded.samples,
        ));

        Ok(Box::new(RodioSource {
            token: ReleaseToken::new(format!("rodio:{}", hooks.handle())),
            sink: Arc::new(sink),
            hooks,
            duration: Some(duration.as_secs_f64()),
            stopped: Arc::new(AtomicBool::new(false)),
            watching: false,
            position_tick: self.position_tick,
            _output: Arc::clone(&self.output),
        }))
    }
}

// ── Source ─────────────────────────────────────────────────────────

/// One decoded narration on its own sink.
pub struct RodioSource {
    sink: Arc<Sink>,
    hooks: PlaybackHooks,
    token: ReleaseToken,
    duration: Option<f64>,
    /// Set by stop/release; silences the watcher.
    stopped: Arc<AtomicBool>,
    watching: bool,
    position_tick: Duration,
    /// Keeps the output device open while this source exists.
    _output: Arc<OutputThread>,
}

impl RodioSource {
    fn spawn_watcher(&self) -> Result<(), PlaybackError> {
        let sink = Arc::clone(&self.sink);
        let hooks = self.hooks.clone();
        let stopped = Arc::clone(&self.stopped);
        let tick = self.position_tick;
        let duration = self.duration;

        thread::Builder::new()
            .name(format!("storyloom-{}", hooks.handle()))
            .spawn(move || {
                loop {
                    thread::sleep(tick);
                    // Drain is read before the stop flag: a stop sets the
                    // flag before it empties the sink.
                    let drained = sink.empty();
                    let halted = stopped.load(Ordering::SeqCst);
                    let observation = observe(
                        halted,
                        drained,
                        sink.is_paused(),
                        sink.get_pos().as_secs_f64(),
                    );
                    match observation {
                        Observation::Exit => return,
                        Observation::Quiet => {}
                        Observation::Position(position) => {
                            if !hooks.emit(PlaybackEventKind::Position(position)) {
                                return;
                            }
                        }
                        Observation::Finished => {
                            if let Some(end) = duration {
                                hooks.emit(PlaybackEventKind::Position(end));
                            }
                            tracing::debug!(handle = %hooks.handle(), "Narration drained");
                            hooks.emit(PlaybackEventKind::Ended);
                            return;
                        }
                    }
                }
            })
            .map(|_| ())
            .map_err(|e| PlaybackError::Output(format!("failed to spawn playback watcher: {e}")))
    }

    fn halt(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.sink.stop();
        }
    }
}

#[async_trait]
impl MediaSource for RodioSource {
    async fn play(&mut self) -> Result<(), PlaybackError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(PlaybackError::Released);
        }
        if !self.watching {
            self.spawn_watcher()?;
            self.watching = true;
        }
        self.sink.play();
        self.hooks.emit(PlaybackEventKind::Started);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(PlaybackError::Released);
        }
        self.sink.pause();
        Ok(())
    }

    fn stop(&mut self) {
        self.halt();
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn release_token(&self) -> &ReleaseToken {
        &self.token
    }

    fn release(self: Box<Self>) {
        tracing::debug!(token = %self.token, "Releasing narration sink");
        self.hooks.detach();
        self.halt();
    }
}

impl Drop for RodioSource {
    fn drop(&mut self) {
        self.halt();
    }
}

// ── Watcher decisions ──────────────────────────────────────────────

/// What the watcher should do after one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Observation {
    /// The source was stopped or released.
    Exit,
    /// Paused; nothing to report.
    Quiet,
    Position(f64),
    /// The queue drained on its own.
    Finished,
}

fn observe(stopped: bool, drained: bool, paused: bool, position: f64) -> Observation {
    if stopped {
        Observation::Exit
    } else if drained {
        Observation::Finished
    } else if paused {
        Observation::Quiet
    } else {
        Observation::Position(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_wins_over_drain() {
        assert_eq!(observe(true, true, false, 3.0), Observation::Exit);
        assert_eq!(observe(true, false, true, 3.0), Observation::Exit);
    }

    #[test]
    fn test_drained_sink_finishes() {
        assert_eq!(observe(false, true, false, 3.0), Observation::Finished);
    }

    #[test]
    fn test_paused_sink_is_quiet() {
        assert_eq!(observe(false, false, true, 1.5), Observation::Quiet);
    }

    #[test]
    fn test_playing_sink_reports_position() {
        assert_eq!(observe(false, false, false, 1.5), Observation::Position(1.5));
    }
}
