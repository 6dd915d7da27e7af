//! Port definitions: the boundary between the session engine and the
//! outside world.
//!
//! # Design Rules
//!
//! - Ports are object-safe traits (`Arc<dyn …>` / `Box<dyn …>`).
//! - Each port defines its own error enum; adapters map their native errors
//!   into it at the boundary.
//! - No port mentions HTTP, rodio, or any other concrete technology.

pub mod generation;
pub mod media;
pub mod story_store;
pub mod synthesis;
pub mod voice_capture;

pub use generation::{GenerationRequest, GenerationTransport, StreamError, TextByteStream};
pub use media::{MediaPlayer, MediaSource, NoopMediaPlayer, PlaybackError};
pub use story_store::{StoreError, StoredStory, StoryStore};
pub use synthesis::{AudioPayload, SpeechSynthesizer, SynthesisError};
pub use voice_capture::{CaptureError, NoopVoiceCapture, VoiceCapture};
