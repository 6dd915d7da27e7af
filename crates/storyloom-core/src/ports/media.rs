//! Media player port: turns an encoded payload into a playable source.
//!
//! A [`MediaSource`] is the platform half of an audio handle. The session
//! engine is its only caller: it opens, plays, pauses, stops and releases
//! sources, and nothing else may touch them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{PlaybackHooks, ReleaseToken};
use crate::ports::synthesis::AudioPayload;

/// Errors from opening or driving a media source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// The payload could not be decoded.
    #[error("Failed to decode audio payload: {0}")]
    Decode(String),

    /// The output device rejected the stream.
    #[error("Audio output error: {0}")]
    Output(String),

    /// No usable output device.
    #[error("Audio device unavailable: {0}")]
    Device(String),

    /// The source was used after its platform resource was freed.
    #[error("Audio source already released")]
    Released,
}

/// A decoded, playable payload.
#[async_trait]
pub trait MediaSource: Send {
    /// Start or resume playback, returning once the platform confirmed it.
    async fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback, keeping the current position.
    fn pause(&mut self) -> Result<(), PlaybackError>;

    /// Stop playback. The source cannot be resumed afterwards.
    fn stop(&mut self);

    /// Total duration in seconds, if the platform knows it yet.
    fn duration(&self) -> Option<f64>;

    fn release_token(&self) -> &ReleaseToken;

    /// Free the platform resource. Consumes the source so it can only
    /// happen once.
    fn release(self: Box<Self>);
}

/// Opens encoded payloads as media sources.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Decode `payload` into a paused source that reports through `hooks`.
    async fn open(
        &self,
        payload: AudioPayload,
        hooks: PlaybackHooks,
    ) -> Result<Box<dyn MediaSource>, PlaybackError>;
}

/// Player for sessions without an audio device.
///
/// Every open fails, so every story turn degrades to a text-only reveal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMediaPlayer;

#[async_trait]
impl MediaPlayer for NoopMediaPlayer {
    async fn open(
        &self,
        _payload: AudioPayload,
        _hooks: PlaybackHooks,
    ) -> Result<Box<dyn MediaSource>, PlaybackError> {
        Err(PlaybackError::Device("audio disabled".to_string()))
    }
}
