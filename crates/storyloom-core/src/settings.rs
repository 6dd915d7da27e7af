//! Settings domain types and validation.
//!
//! These are pure domain types; the CLI fills them from flags and the
//! environment, and the session/remote crates derive their configs from them.

use serde::{Deserialize, Serialize};
use url::Url;

/// Default story service base URL.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default bounded wait for audio duration metadata, in milliseconds.
pub const DEFAULT_DURATION_WAIT_MS: u64 = 250;

/// Default cadence of playback position events, in milliseconds.
pub const DEFAULT_POSITION_TICK_MS: u64 = 200;

/// Improvisations accepted per story.
pub const MAX_IMPROVISATIONS: u8 = 3;

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the story service.
    pub server_url: Option<String>,

    /// Timeout for individual HTTP requests (1-300 seconds).
    pub request_timeout_secs: Option<u64>,

    /// How long to wait for the audio duration before giving up on it.
    pub duration_wait_ms: Option<u64>,

    /// Interval between playback position events (20-2000 ms).
    pub position_tick_ms: Option<u64>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            duration_wait_ms: Some(DEFAULT_DURATION_WAIT_MS),
            position_tick_ms: Some(DEFAULT_POSITION_TICK_MS),
        }
    }

    #[must_use]
    pub fn effective_server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    #[must_use]
    pub const fn effective_request_timeout_secs(&self) -> u64 {
        match self.request_timeout_secs {
            Some(secs) => secs,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub const fn effective_duration_wait_ms(&self) -> u64 {
        match self.duration_wait_ms {
            Some(ms) => ms,
            None => DEFAULT_DURATION_WAIT_MS,
        }
    }

    #[must_use]
    pub const fn effective_position_tick_ms(&self) -> u64 {
        match self.position_tick_ms {
            Some(ms) => ms,
            None => DEFAULT_POSITION_TICK_MS,
        }
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref url) = other.server_url {
            self.server_url.clone_from(url);
        }
        if let Some(ref secs) = other.request_timeout_secs {
            self.request_timeout_secs = *secs;
        }
        if let Some(ref ms) = other.duration_wait_ms {
            self.duration_wait_ms = *ms;
        }
        if let Some(ref ms) = other.position_tick_ms {
            self.position_tick_ms = *ms;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub server_url: Option<Option<String>>,
    pub request_timeout_secs: Option<Option<u64>>,
    pub duration_wait_ms: Option<Option<u64>>,
    pub position_tick_ms: Option<Option<u64>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Server URL must be an absolute http(s) URL, got '{0}'")]
    InvalidServerUrl(String),

    #[error("Request timeout must be between 1 and 300 seconds, got {0}")]
    InvalidRequestTimeout(u64),

    #[error("Duration wait must be at most 5000 ms, got {0}")]
    InvalidDurationWait(u64),

    #[error("Position tick must be between 20 and 2000 ms, got {0}")]
    InvalidPositionTick(u64),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref raw) = settings.server_url {
        let valid = Url::parse(raw)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
        if !valid {
            return Err(SettingsError::InvalidServerUrl(raw.clone()));
        }
    }

    if let Some(secs) = settings.request_timeout_secs {
        if !(1..=300).contains(&secs) {
            return Err(SettingsError::InvalidRequestTimeout(secs));
        }
    }

    if let Some(ms) = settings.duration_wait_ms {
        if ms > 5000 {
            return Err(SettingsError::InvalidDurationWait(ms));
        }
    }

    if let Some(ms) = settings.position_tick_ms {
        if !(20..=2000).contains(&ms) {
            return Err(SettingsError::InvalidPositionTick(ms));
        }
    }

    Ok(())
}
