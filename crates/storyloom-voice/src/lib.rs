#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod decode;
pub mod error;
pub mod output_thread;
pub mod playback;

pub use decode::{DecodedAudio, decode_payload};
pub use error::VoiceError;
pub use output_thread::OutputThread;
pub use playback::{RodioMediaPlayer, RodioSource};
