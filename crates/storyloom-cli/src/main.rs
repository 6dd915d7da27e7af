//! CLI entry point - the composition root.
//!
//! Infrastructure is wired together in [`bootstrap`]; command dispatch
//! routes to handlers.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use storyloom_cli::handlers::session::{self, Opening};
use storyloom_cli::{Cli, CliConfig, CliError, Commands, bootstrap};

/// Logs go to stderr so story text on stdout stays clean.
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

async fn dispatch(command: Commands, config: &CliConfig) -> Result<(), CliError> {
    let ctx = bootstrap(config)?;

    let opening = match command {
        Commands::New {
            theme,
            improvisations,
        } => Opening::New {
            theme,
            improvisations,
        },
        Commands::Resume { story_id } => Opening::Resume { story_id },
    };
    session::execute(&ctx, opening).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = CliConfig {
        server_url: cli.server_url,
        request_timeout_secs: cli.request_timeout,
        no_audio: cli.no_audio,
    };

    if let Err(e) = dispatch(cli.command, &config).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
