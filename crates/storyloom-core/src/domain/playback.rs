//! Playback domain types shared by the session engine and media adapters.
//!
//! Media adapters report what the platform player is doing through
//! [`PlaybackHooks`]. Every event is tagged with the [`HandleId`] of the audio
//! handle that produced it so the session can discard residual events from a
//! handle that is no longer current.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// ── Identity ───────────────────────────────────────────────────────

/// Identity of one prepared audio handle.
///
/// Assigned monotonically by the session controller; never reused within a
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "audio#{}", self.0)
    }
}

/// Opaque key of the platform resource backing a media source.
///
/// Analogous to an object URL: it names the decoded payload so the adapter
/// can free it. Released exactly once, when the owning handle is released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseToken(String);

impl ReleaseToken {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Session-wide playback state ────────────────────────────────────

/// Coarse playback status, global to the session (not per turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    /// No narration is associated with the session right now.
    #[default]
    Idle,
    /// Synthesis has been requested and the handle is not ready yet.
    PreparingAudio,
    Playing,
    Paused,
    /// The current narration finished and its handle was released.
    Ended,
    /// The current narration failed to play and its handle was released.
    Failed,
}

/// Playback status plus the turn currently associated with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub turn: Option<usize>,
}

impl PlaybackState {
    #[must_use]
    pub const fn new(status: PlaybackStatus, turn: Option<usize>) -> Self {
        Self { status, turn }
    }

    #[must_use]
    pub const fn idle() -> Self {
        Self::new(PlaybackStatus::Idle, None)
    }
}

// ── Player events ──────────────────────────────────────────────────

/// What a media source reported.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEventKind {
    /// Playback actually started (or resumed).
    Started,
    /// Live playback position, in seconds from the start of the payload.
    Position(f64),
    /// The payload played to its end.
    Ended,
    /// The platform failed to decode or play the payload.
    Error(String),
}

/// An event from a specific audio handle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    pub handle: HandleId,
    pub kind: PlaybackEventKind,
}

/// Sender half given to a media source when it is opened.
///
/// Clones share a single attachment flag: once [`detach`](Self::detach) is
/// called on any clone, every clone stops delivering events. The session
/// detaches a handle's hooks before releasing it, so a late callback from a
/// platform thread can never reach the session.
#[derive(Debug, Clone)]
pub struct PlaybackHooks {
    handle: HandleId,
    tx: mpsc::UnboundedSender<PlaybackEvent>,
    attached: Arc<AtomicBool>,
}

impl PlaybackHooks {
    #[must_use]
    pub fn new(handle: HandleId, tx: mpsc::UnboundedSender<PlaybackEvent>) -> Self {
        Self {
            handle,
            tx,
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub const fn handle(&self) -> HandleId {
        self.handle
    }

    /// Deliver an event. Returns `false` if the hooks were detached or the
    /// session is gone.
    pub fn emit(&self, kind: PlaybackEventKind) -> bool {
        if !self.is_attached() {
            tracing::trace!(handle = %self.handle, ?kind, "Dropping event from detached hooks");
            return false;
        }
        self.tx
            .send(PlaybackEvent {
                handle: self.handle,
                kind,
            })
            .is_ok()
    }

    /// Stop delivering events from this handle, on every clone.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}
