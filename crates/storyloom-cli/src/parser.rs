//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the storyteller.
#[derive(Parser)]
#[command(name = "storyloom")]
#[command(about = "Listen to stories that grow with your improvisations")]
#[command(version)]
pub struct Cli {
    /// Base URL of the story service
    #[arg(long = "server-url", env = "STORYLOOM_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Timeout for speech and story requests, in seconds
    #[arg(long = "request-timeout", env = "STORYLOOM_REQUEST_TIMEOUT", global = true)]
    pub request_timeout: Option<u64>,

    /// Show text without narration
    #[arg(long = "no-audio", env = "STORYLOOM_NO_AUDIO", global = true)]
    pub no_audio: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
