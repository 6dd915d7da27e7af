//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and mappings
//! from the session, settings and remote errors to exit codes.

use storyloom_core::SettingsError;
use storyloom_remote::RemoteError;
use storyloom_session::SessionError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The story session failed.
    #[error("{0}")]
    Session(String),

    /// Argument or input error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (terminal, stdin).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The story service could not be reached or misbehaved.
    #[error("Story service error: {0}")]
    Service(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Session(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Service(_) => 69,  // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::EmptyTheme | SessionError::EmptyImprovisation => {
                Self::Arguments(err.to_string())
            }
            SessionError::Stream(_) | SessionError::Store(_) => Self::Service(err.to_string()),
            other => Self::Session(other.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RemoteError> for CliError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::InvalidUrl(_) => Self::Config(err.to_string()),
            other => Self::Service(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
