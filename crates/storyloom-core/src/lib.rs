#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod settings;

pub use domain::{
    HandleId, PlaybackEvent, PlaybackEventKind, PlaybackHooks, PlaybackState, PlaybackStatus,
    ReleaseToken, Turn, TurnKind, count_words,
};
pub use ports::{
    AudioPayload, CaptureError, GenerationRequest, GenerationTransport, MediaPlayer, MediaSource,
    NoopMediaPlayer, NoopVoiceCapture, PlaybackError, SpeechSynthesizer, StoreError, StoredStory,
    StoryStore, StreamError, SynthesisError, TextByteStream, VoiceCapture,
};
pub use settings::{
    DEFAULT_DURATION_WAIT_MS, DEFAULT_POSITION_TICK_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SERVER_URL, MAX_IMPROVISATIONS, Settings, SettingsError, SettingsUpdate,
    validate_settings,
};
