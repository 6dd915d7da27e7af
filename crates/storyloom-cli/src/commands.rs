//! Available subcommands.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new story from a theme
    New {
        /// What the story should be about
        theme: String,
        /// Improvisations to weave into the opening (repeatable)
        #[arg(short = 'i', long = "improvisation")]
        improvisations: Vec<String>,
    },

    /// Continue a story saved on the story service
    Resume {
        /// Story id issued by the service
        story_id: String,
    },
}
