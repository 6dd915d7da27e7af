#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod handle;
pub mod preparer;
pub mod sequencer;
pub mod stream;
pub mod sync;

pub use config::SessionConfig;
pub use controller::{AbortHandle, SessionController, SessionPorts};
pub use error::{PrepareFailure, SequencerError, SessionError};
pub use events::{SessionEvent, SessionState};
pub use handle::AudioHandle;
pub use preparer::AudioPreparer;
pub use sequencer::{AudioOutcome, StoryOrigin, TurnSequencer};
pub use stream::{
    StreamCompletion, StreamConsumer, StreamRecord, continuation_text, parse_line, records,
};
pub use sync::{Highlight, PlaybackSynchronizer, highlight_index};

// Only used by the integration tests
#[cfg(test)]
use mockall as _;
