//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. All concrete implementations are instantiated here:
//! - Story service client (via storyloom-remote)
//! - Narration player (via storyloom-voice, or text-only)
//! - Voice capture (text-only terminals get the no-op capture)
//!
//! Command handlers receive the composed context and build sessions from it.

use std::sync::Arc;

use storyloom_core::{
    MediaPlayer, NoopMediaPlayer, NoopVoiceCapture, Settings, SettingsUpdate, VoiceCapture,
    validate_settings,
};
use storyloom_remote::{HttpStoryClient, RemoteConfig};
use storyloom_session::{SessionConfig, SessionPorts};
use storyloom_voice::RodioMediaPlayer;
use tracing::{info, warn};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub server_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Skip the audio device entirely.
    pub no_audio: bool,
}

impl CliConfig {
    /// Defaults with the command-line overrides applied, validated.
    pub fn settings(&self) -> Result<Settings, CliError> {
        let mut settings = Settings::with_defaults();
        settings.merge(&SettingsUpdate {
            server_url: self.server_url.clone().map(Some),
            request_timeout_secs: self.request_timeout_secs.map(Some),
            ..SettingsUpdate::default()
        });
        validate_settings(&settings)?;
        Ok(settings)
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub settings: Settings,
    /// Story service client; serves generation, speech and saved stories.
    pub client: Arc<HttpStoryClient>,
    pub player: Arc<dyn MediaPlayer>,
    /// Whether narration is actually audible.
    pub audio: bool,
}

impl CliContext {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::from(&self.settings)
    }

    /// Ports for a fresh session.
    pub fn ports(&self) -> SessionPorts {
        SessionPorts {
            transport: self.client.clone(),
            synthesizer: self.client.clone(),
            player: Arc::clone(&self.player),
        }
    }

    /// Speech input for `/voice`.
    pub fn voice_capture(&self) -> Box<dyn VoiceCapture> {
        Box::new(NoopVoiceCapture)
    }
}

/// Bootstrap the CLI context.
///
/// A missing audio device is not fatal: the session falls back to
/// text-only turns.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let settings = config.settings()?;
    let client = HttpStoryClient::new(RemoteConfig::from_settings(&settings)?)?;
    info!(server = settings.effective_server_url(), "Story service configured");

    let (player, audio): (Arc<dyn MediaPlayer>, bool) = if config.no_audio {
        (Arc::new(NoopMediaPlayer), false)
    } else {
        match RodioMediaPlayer::from_settings(&settings) {
            Ok(player) => (Arc::new(player), true),
            Err(e) => {
                warn!(error = %e, "Audio output unavailable; continuing without narration");
                (Arc::new(NoopMediaPlayer), false)
            }
        }
    };

    Ok(CliContext {
        settings,
        client: Arc::new(client),
        player,
        audio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_apply_overrides() {
        let config = CliConfig {
            server_url: Some("https://stories.example.com".to_string()),
            request_timeout_secs: Some(5),
            no_audio: true,
        };
        let settings = config.settings().unwrap();
        assert_eq!(settings.effective_server_url(), "https://stories.example.com");
        assert_eq!(settings.effective_request_timeout_secs(), 5);
        assert_eq!(
            settings.effective_duration_wait_ms(),
            storyloom_core::DEFAULT_DURATION_WAIT_MS
        );
    }

    #[test]
    fn test_settings_reject_bad_url() {
        let config = CliConfig {
            server_url: Some("ftp://stories.example.com".to_string()),
            ..CliConfig::default()
        };
        assert!(matches!(config.settings(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_bootstrap_without_audio() {
        let config = CliConfig {
            no_audio: true,
            ..CliConfig::default()
        };
        let ctx = bootstrap(&config).unwrap();
        assert!(!ctx.audio);
        assert_eq!(ctx.session_config().max_improvisations, storyloom_core::MAX_IMPROVISATIONS);
    }
}
