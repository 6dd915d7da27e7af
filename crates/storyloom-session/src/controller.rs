//! Session controller: the generate → prepare → reveal-and-play cycle.
//!
//! ```text
//!   Idle → Generating → PreparingAudio ─┬→ Playing ⇄ Paused → Ended
//!             ▲                          └→ RevealedWithoutAudio
//!             └──────── submit_improvisation ────────────┘
//!
//!   (any) → Aborted
//! ```
//!
//! The controller is the only owner of the live [`AudioHandle`]. Every
//! transition that retires a handle goes through
//! [`release_current`](SessionController::release_current), which detaches
//! the handle's hooks before stopping and freeing it, so residual platform
//! events can never move the highlight.
//!
//! Operations take `&mut self`; the only concurrent actor is an
//! [`AbortHandle`] held elsewhere (e.g. a Ctrl-C task). Each in-flight
//! suspension point races the abort token, and every continuation checks
//! the session generation before applying its result.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use storyloom_core::{
    GenerationRequest, GenerationTransport, HandleId, MediaPlayer, PlaybackError, PlaybackEvent,
    PlaybackEventKind, PlaybackHooks, PlaybackState, PlaybackStatus, SpeechSynthesizer,
    StoryStore, StreamError, Turn,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::events::{SessionEvent, SessionState};
use crate::handle::AudioHandle;
use crate::preparer::AudioPreparer;
use crate::sequencer::{AudioOutcome, StoryOrigin, TurnSequencer};
use crate::stream::{StreamCompletion, StreamConsumer, continuation_text};
use crate::sync::{Highlight, PlaybackSynchronizer};

// ── Ports bundle ───────────────────────────────────────────────────

/// The external collaborators a session needs.
#[derive(Clone)]
pub struct SessionPorts {
    pub transport: Arc<dyn GenerationTransport>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub player: Arc<dyn MediaPlayer>,
}

// ── External abort ─────────────────────────────────────────────────

/// Cloneable teardown trigger for a running session.
///
/// Aborting bumps the shared session generation and cancels the token, so
/// an operation suspended on the network or the audio device wakes up with
/// [`SessionError::Aborted`] and its eventual result is discarded.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    token: CancellationToken,
    generation: Arc<AtomicU64>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Race `fut` against the abort token.
async fn with_abort<F: Future>(
    token: &CancellationToken,
    fut: F,
) -> Result<F::Output, SessionError> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(SessionError::Aborted),
        out = fut => Ok(out),
    }
}

// ── Controller ─────────────────────────────────────────────────────

/// Drives one story session.
pub struct SessionController {
    consumer: StreamConsumer,
    preparer: AudioPreparer,
    sequencer: TurnSequencer,
    sync: PlaybackSynchronizer,

    state: SessionState,
    playback: PlaybackState,
    complete: bool,
    waiting_for_input: bool,
    /// Story text as the service knows it, across all turns.
    transcript: String,
    /// Single-use start latch.
    started: bool,
    session_id: String,

    /// The one live narration, if any.
    current: Option<AudioHandle>,
    next_handle: u64,

    abort: AbortHandle,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    playback_tx: mpsc::UnboundedSender<PlaybackEvent>,
    playback_rx: mpsc::UnboundedReceiver<PlaybackEvent>,
}

impl SessionController {
    /// Create a session and the receiver for its events.
    pub fn new(
        config: &SessionConfig,
        ports: SessionPorts,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (playback_tx, playback_rx) = mpsc::unbounded_channel();

        let controller = Self {
            consumer: StreamConsumer::new(ports.transport),
            preparer: AudioPreparer::new(ports.synthesizer, ports.player, config.duration_wait),
            sequencer: TurnSequencer::new(config.max_improvisations),
            sync: PlaybackSynchronizer::new(),
            state: SessionState::Idle,
            playback: PlaybackState::idle(),
            complete: false,
            waiting_for_input: false,
            transcript: String::new(),
            started: false,
            session_id: uuid::Uuid::new_v4().to_string(),
            current: None,
            next_handle: 0,
            abort: AbortHandle::default(),
            event_tx,
            playback_tx,
            playback_rx,
        };

        (controller, event_rx)
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn turns(&self) -> &[Turn] {
        self.sequencer.turns()
    }

    /// Whether all improvisations have been used.
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    pub const fn improvisations(&self) -> u8 {
        self.sequencer.improvisations()
    }

    pub const fn remaining_improvisations(&self) -> u8 {
        self.sequencer.remaining()
    }

    /// Whether the last completion asked for the user's next move.
    pub const fn waiting_for_input(&self) -> bool {
        self.waiting_for_input
    }

    /// Id sent with continuation requests. Replaced by the server-issued
    /// story id once one is known.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn highlight(&self) -> Option<Highlight> {
        self.sync.current()
    }

    /// Id of the live audio handle, if any.
    pub fn current_handle(&self) -> Option<HandleId> {
        self.current.as_ref().map(AudioHandle::id)
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    // ── Operations ─────────────────────────────────────────────────

    /// Generate the opening of a new story.
    ///
    /// Guarded by a single-use latch: once a session has started (or
    /// resumed), further calls return `Ok(())` without doing anything.
    pub async fn start(
        &mut self,
        theme: &str,
        prior_improvisations: Vec<String>,
    ) -> Result<(), SessionError> {
        if self.started {
            debug!("Session already started; ignoring duplicate start");
            return Ok(());
        }
        self.ensure_live()?;
        let theme = theme.trim();
        if theme.is_empty() {
            return Err(SessionError::EmptyTheme);
        }

        self.started = true;
        self.sequencer.reset();
        self.complete = false;
        info!(session = %self.session_id, theme, "Starting story session");

        let request = GenerationRequest::Opening {
            theme: theme.to_string(),
            prior_improvisations,
            session_id: self.session_id.clone(),
        };
        self.run_cycle(request).await
    }

    /// Load a saved story instead of generating a new one.
    ///
    /// Shares the start latch with [`start`](Self::start). The saved text
    /// becomes a single un-narrated story turn.
    pub async fn resume_existing(
        &mut self,
        store: &dyn StoryStore,
        story_id: &str,
    ) -> Result<(), SessionError> {
        if self.started {
            debug!("Session already started; ignoring resume");
            return Ok(());
        }
        self.ensure_live()?;
        self.started = true;

        let generation = self.abort.generation();
        let fetched = with_abort(&self.abort.token, store.fetch_story(story_id)).await;
        let story = match self.settle(generation, fetched)? {
            Ok(story) => story,
            Err(e) => {
                warn!(story_id, error = %e, "Failed to load story");
                self.set_state(SessionState::Ended);
                self.emit(SessionEvent::Error(e.to_string()));
                return Err(e.into());
            }
        };

        if !story.story_id.is_empty() {
            self.session_id.clone_from(&story.story_id);
        }
        let used = self
            .sequencer
            .max_improvisations()
            .saturating_sub(story.remaining_improvisations);
        let index = self.sequencer.seed(&story.content, used);
        self.transcript = story.content;
        info!(session = %self.session_id, used, "Resumed saved story");

        self.emit_turn(index);
        self.set_state(SessionState::RevealedWithoutAudio);
        self.check_complete();
        Ok(())
    }

    /// Append the user's improvisation and generate the continuation.
    ///
    /// Rejected before any network call when the text is blank or the
    /// improvisation limit is reached. Any narration still live from the
    /// previous turn is released first.
    pub async fn submit_improvisation(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_live()?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyImprovisation);
        }
        if !self.sequencer.has_story() {
            return Err(SessionError::NotStarted);
        }
        self.sequencer.ensure_can_improvise()?;

        self.release_current();
        self.set_playback(PlaybackStatus::Idle, None);
        let index = self.sequencer.append_user_turn(text)?;
        self.emit_turn(index);

        let request = GenerationRequest::Continuation {
            session_id: self.session_id.clone(),
            improvisation: text.to_string(),
        };
        self.run_cycle(request).await
    }

    /// Pause the live narration, freezing the highlight.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        if self.state != SessionState::Playing {
            return Err(self.invalid("pause"));
        }
        let Some(handle) = self.current.as_mut() else {
            return Err(self.invalid("pause"));
        };

        match handle.pause() {
            Ok(()) => {
                self.sync.freeze();
                self.set_state(SessionState::Paused);
                self.set_playback(PlaybackStatus::Paused, self.playback.turn);
            }
            Err(e) => self.fail_playback(&e),
        }
        Ok(())
    }

    /// Resume the paused narration from where it stopped.
    ///
    /// Reuses the existing handle; nothing is fetched or prepared again.
    pub async fn resume(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        if self.state != SessionState::Paused {
            return Err(self.invalid("resume"));
        }

        let generation = self.abort.generation();
        let token = self.abort.token.clone();
        let Some(handle) = self.current.as_mut() else {
            return Err(self.invalid("resume"));
        };
        let played = with_abort(&token, handle.play()).await;

        match self.settle(generation, played)? {
            Ok(()) => {
                self.sync.thaw();
                self.set_state(SessionState::Playing);
                self.set_playback(PlaybackStatus::Playing, self.playback.turn);
            }
            Err(e) => self.fail_playback(&e),
        }
        Ok(())
    }

    /// Tear the session down. Idempotent.
    pub fn abort(&mut self) {
        self.abort.abort();
        self.teardown();
    }

    // ── Playback events ────────────────────────────────────────────

    /// Wait for the next event from the media adapter.
    ///
    /// Returns `None` once the session has been aborted.
    pub async fn next_playback_event(&mut self) -> Option<PlaybackEvent> {
        if self.state == SessionState::Aborted {
            return None;
        }
        let token = self.abort.token.clone();
        let event = tokio::select! {
            biased;
            () = token.cancelled() => None,
            event = self.playback_rx.recv() => event,
        };
        if event.is_none() {
            self.teardown();
        }
        event
    }

    /// Apply an event from the media adapter.
    ///
    /// Events from any handle other than the live one are discarded.
    pub fn handle_playback_event(&mut self, event: PlaybackEvent) {
        if self.abort.is_aborted() {
            self.teardown();
            return;
        }
        let Some(current) = self.current_handle() else {
            debug!(handle = %event.handle, "Discarding playback event: no live handle");
            return;
        };
        if event.handle != current {
            debug!(handle = %event.handle, %current, "Discarding stale playback event");
            return;
        }

        match event.kind {
            PlaybackEventKind::Started => {
                debug!(handle = %current, "Playback start confirmed");
            }
            PlaybackEventKind::Position(position) => {
                if let Some(highlight) = self.sync.on_position(current, position) {
                    self.emit(SessionEvent::Highlight(highlight));
                }
            }
            PlaybackEventKind::Ended => {
                let turn = self.release_current();
                info!(turn, "Narration finished");
                self.set_playback(PlaybackStatus::Ended, turn);
                self.set_state(SessionState::Ended);
            }
            PlaybackEventKind::Error(message) => {
                self.fail_playback(&PlaybackError::Output(message));
            }
        }
    }

    /// Apply every playback event already queued. Returns how many were
    /// processed.
    pub fn process_pending_playback_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.playback_rx.try_recv() {
            self.handle_playback_event(event);
            processed += 1;
        }
        processed
    }

    // ── Cycle ──────────────────────────────────────────────────────

    async fn run_cycle(&mut self, request: GenerationRequest) -> Result<(), SessionError> {
        let generation = self.abort.generation();
        let origin = if request.is_continuation() {
            StoryOrigin::Continuation
        } else {
            StoryOrigin::Opening
        };

        self.release_current();
        self.set_state(SessionState::Generating);

        let progress_tx = self.event_tx.clone();
        let generated = with_abort(
            &self.abort.token,
            self.consumer.generate(&request, move |text| {
                let _ = progress_tx.send(SessionEvent::TextProgress(text.to_string()));
            }),
        )
        .await;

        let completion = match self.settle(generation, generated)? {
            Ok(completion) => completion,
            Err(e) => return Err(self.fail_generation(e)),
        };
        let StreamCompletion {
            text,
            story_id,
            waiting_for_input,
        } = completion;
        let text = self.absorb_story_text(text, origin);
        if text.trim().is_empty() {
            return Err(self.fail_generation(StreamError::Protocol(
                "completion carried no story text".to_string(),
            )));
        }
        self.waiting_for_input = waiting_for_input;
        self.adopt_story_id(story_id);

        self.set_state(SessionState::PreparingAudio);
        let hooks = PlaybackHooks::new(self.allocate_handle_id(), self.playback_tx.clone());
        let owner = self.sequencer.next_index();
        let prepared = with_abort(
            &self.abort.token,
            self.preparer.prepare(&text, hooks, owner),
        )
        .await;

        match self.settle(generation, prepared)? {
            Ok(handle) => self.reveal_and_play(&text, handle, origin, generation).await?,
            Err(failure) => {
                warn!(%failure, "Narration unavailable; revealing text only");
                let index = self
                    .sequencer
                    .append_story_turn(&text, AudioOutcome::Unavailable, origin);
                self.emit_turn(index);
                self.set_state(SessionState::RevealedWithoutAudio);
            }
        }

        self.check_complete();
        Ok(())
    }

    async fn reveal_and_play(
        &mut self,
        text: &str,
        handle: AudioHandle,
        origin: StoryOrigin,
        generation: u64,
    ) -> Result<(), SessionError> {
        let index = self
            .sequencer
            .append_story_turn(text, AudioOutcome::Ready, origin);
        debug_assert_eq!(index, handle.owner_turn());

        self.sync.bind(&handle);
        self.current = Some(handle);
        self.emit_turn(index);
        self.set_playback(PlaybackStatus::PreparingAudio, Some(index));

        let token = self.abort.token.clone();
        let Some(handle) = self.current.as_mut() else {
            return Ok(());
        };
        let played = with_abort(&token, handle.play()).await;

        match self.settle(generation, played)? {
            Ok(()) => {
                info!(turn = index, "Revealed story turn with narration");
                self.set_state(SessionState::Playing);
                self.set_playback(PlaybackStatus::Playing, Some(index));
            }
            Err(e) => self.fail_playback(&e),
        }
        Ok(())
    }

    // ── Transitions ────────────────────────────────────────────────

    fn fail_generation(&mut self, error: StreamError) -> SessionError {
        warn!(error = %error, "Story generation failed");
        self.set_state(SessionState::Ended);
        self.emit(SessionEvent::Error(error.to_string()));
        error.into()
    }

    fn fail_playback(&mut self, error: &PlaybackError) {
        warn!(error = %error, "Narration playback failed");
        let turn = self.release_current();
        self.set_playback(PlaybackStatus::Failed, turn);
        self.set_state(SessionState::Ended);
    }

    fn check_complete(&mut self) {
        if !self.complete && self.sequencer.is_exhausted() {
            self.complete = true;
            info!(session = %self.session_id, "Story complete; no improvisations left");
            self.emit(SessionEvent::Completed);
        }
    }

    fn teardown(&mut self) {
        if self.state == SessionState::Aborted {
            return;
        }
        self.release_current();
        self.set_playback(PlaybackStatus::Idle, None);
        self.set_state(SessionState::Aborted);
        info!(session = %self.session_id, "Session aborted");
    }

    /// Stop and release the live handle, clearing its highlight. Returns
    /// the turn it narrated.
    fn release_current(&mut self) -> Option<usize> {
        let handle = self.current.take()?;
        let turn = handle.owner_turn();
        if let Some(cleared) = self.sync.clear() {
            self.emit(SessionEvent::Highlight(cleared));
        }
        handle.release();
        Some(turn)
    }

    /// Resolve an abortable result, tearing down if the session was
    /// aborted or superseded while it was in flight.
    fn settle<T>(
        &mut self,
        generation: u64,
        outcome: Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        if outcome.is_err() || generation != self.abort.generation() {
            debug!(generation, "Discarding result of aborted operation");
            self.teardown();
            return Err(SessionError::Aborted);
        }
        outcome
    }

    fn ensure_live(&mut self) -> Result<(), SessionError> {
        if self.abort.is_aborted() {
            self.teardown();
        }
        if self.state == SessionState::Aborted {
            return Err(SessionError::Aborted);
        }
        Ok(())
    }

    /// Record the service's story text and return the part that belongs to
    /// the new turn.
    fn absorb_story_text(&mut self, text: String, origin: StoryOrigin) -> String {
        if origin == StoryOrigin::Opening {
            self.transcript.clone_from(&text);
            return text;
        }

        let fresh = continuation_text(&self.transcript, &text).to_string();
        if fresh.len() < text.len() {
            debug!(previous = self.transcript.len(), "Stripped repeated story prefix");
            self.transcript = text;
        } else if !fresh.trim().is_empty() {
            if !self.transcript.is_empty() {
                self.transcript.push_str("\n\n");
            }
            self.transcript.push_str(fresh.trim());
        }
        fresh
    }

    fn adopt_story_id(&mut self, story_id: Option<String>) {
        if let Some(id) = story_id.filter(|id| !id.is_empty() && *id != self.session_id) {
            debug!(old = %self.session_id, new = %id, "Adopting server story id");
            self.session_id = id;
        }
    }

    fn allocate_handle_id(&mut self) -> HandleId {
        self.next_handle += 1;
        HandleId(self.next_handle)
    }

    const fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            state: self.state,
        }
    }

    // ── Event helpers ──────────────────────────────────────────────

    fn set_state(&mut self, new_state: SessionState) {
        if self.state != new_state {
            debug!(old = ?self.state, new = ?new_state, "Session state transition");
            self.state = new_state;
            self.emit(SessionEvent::StateChanged(new_state));
        }
    }

    fn set_playback(&mut self, status: PlaybackStatus, turn: Option<usize>) {
        let next = PlaybackState::new(status, turn);
        if self.playback != next {
            self.playback = next;
            self.emit(SessionEvent::PlaybackChanged(next));
        }
    }

    fn emit_turn(&self, index: usize) {
        if let Some(turn) = self.sequencer.turn(index) {
            self.emit(SessionEvent::TurnAppended(turn.clone()));
        }
    }

    /// Emit a session event (best-effort; a dropped receiver is logged).
    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Session event receiver dropped");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.abort();
    }
}
