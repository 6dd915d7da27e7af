//! Payload decoding.
//!
//! Narration is decoded to PCM up front so the exact duration is known before
//! playback starts, which mp3 headers alone do not guarantee.

use std::io::Cursor;
use std::time::Duration;

use bytes::Bytes;
use rodio::{Decoder, Source};
use storyloom_core::PlaybackError;

/// A fully decoded payload, ready to queue on a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub channels: u16,
    pub sample_rate: u32,
    /// Interleaved samples.
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    /// Exact playback length.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() / usize::from(self.channels.max(1));
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate.max(1)))
    }
}

/// Decode an encoded payload (mp3 or wav).
///
/// Blocking: call from `spawn_blocking`.
pub fn decode_payload(bytes: Bytes) -> Result<DecodedAudio, PlaybackError> {
    let decoder =
        Decoder::new(Cursor::new(bytes)).map_err(|e| PlaybackError::Decode(e.to_string()))?;

    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    if channels == 0 || sample_rate == 0 {
        return Err(PlaybackError::Decode(format!(
            "unsupported stream layout: {channels} channels at {sample_rate} Hz"
        )));
    }

    let samples: Vec<f32> = decoder.convert_samples().collect();
    if samples.is_empty() {
        return Err(PlaybackError::Decode("payload contains no audio".to_string()));
    }

    Ok(DecodedAudio {
        channels,
        sample_rate,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 16-bit PCM WAV file.
    fn wav(channels: u16, sample_rate: u32, frames: usize) -> Vec<u8> {
        let data_len = u32::try_from(frames * usize::from(channels) * 2).unwrap();
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16_u32.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * u32::from(channels) * 2).to_le_bytes());
        out.extend_from_slice(&(channels * 2).to_le_bytes());
        out.extend_from_slice(&16_u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for i in 0..frames * usize::from(channels) {
            let sample = i16::try_from(i % 2000).unwrap() - 1000;
            out.extend_from_slice(&sample.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_decodes_wav_with_exact_duration() {
        let decoded = decode_payload(Bytes::from(wav(1, 8000, 4000))).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.len(), 4000);
        assert_eq!(decoded.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_stereo_duration_counts_frames() {
        let decoded = decode_payload(Bytes::from(wav(2, 16_000, 16_000))).unwrap();
        assert_eq!(decoded.samples.len(), 32_000);
        assert_eq!(decoded.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_payload(Bytes::from_static(b"definitely not audio")).unwrap_err();
        assert!(matches!(err, PlaybackError::Decode(_)));
    }

    #[test]
    fn test_silent_payload_is_decode_error() {
        let err = decode_payload(Bytes::from(wav(1, 8000, 0))).unwrap_err();
        assert!(matches!(err, PlaybackError::Decode(_)));
    }
}
