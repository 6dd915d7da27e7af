//! Narration playback error types.

use storyloom_core::PlaybackError;

/// Errors from setting up audio output.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// No audio output device found.
    #[error("No audio output device found: {0}")]
    NoOutputDevice(String),

    /// Failed to open an output sink.
    #[error("Failed to open audio output stream: {0}")]
    OutputStreamError(String),

    /// The output thread could not be started or exited early.
    #[error("Audio output thread died")]
    AudioThreadDied,
}

impl From<VoiceError> for PlaybackError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::NoOutputDevice(msg) => Self::Device(msg),
            VoiceError::OutputStreamError(msg) => Self::Output(msg),
            VoiceError::AudioThreadDied => Self::Device("audio output thread died".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_playback_error() {
        assert_eq!(
            PlaybackError::from(VoiceError::NoOutputDevice("none".to_string())),
            PlaybackError::Device("none".to_string())
        );
        assert_eq!(
            PlaybackError::from(VoiceError::OutputStreamError("busy".to_string())),
            PlaybackError::Output("busy".to_string())
        );
        assert!(matches!(
            PlaybackError::from(VoiceError::AudioThreadDied),
            PlaybackError::Device(_)
        ));
    }
}
