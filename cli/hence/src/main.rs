//! Hence CLI
//!
//! Thin command-line client for the Hence project-sharing gallery. Each
//! subcommand is one "skill": authenticate, share or update a project,
//! manage screenshots, capture them, search the gallery, manage
//! collections, fetch metadata, or submit feedback.
//!
//! Every subcommand exits 0 on success and 1 on any reported error, with a
//! one-line diagnostic on stderr. `HENCE_API_URL` overrides the API origin
//! uniformly.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hence_auth::Settings;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hence", version, about = "Command-line skills for the Hence gallery")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate with the Hence API (device flow, API key, or --check)
    Auth(commands::auth::AuthArgs),
    /// Share a project to the gallery
    Share(commands::share::ShareArgs),
    /// Update an existing project
    Update(commands::update::UpdateArgs),
    /// Manage screenshots on an existing project
    Screenshots(commands::screenshots::ScreenshotsArgs),
    /// Capture a screenshot of a web app via Playwright
    Capture(commands::capture::CaptureArgs),
    /// Search the gallery for projects
    Search(commands::search::SearchArgs),
    /// Manage collections
    Collections(commands::collections::CollectionsArgs),
    /// Submit feedback about the Hence experience
    Feedback(commands::feedback::FeedbackArgs),
    /// Fetch gallery metadata: topics, agents, models
    Metadata(commands::metadata::MetadataArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output; quiet unless
    // LOG_LEVEL / RUST_LOG asks for more.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Auth(args) => commands::auth::run(args, settings).await,
        Command::Share(args) => commands::share::run(args, settings).await,
        Command::Update(args) => commands::update::run(args, settings).await,
        Command::Screenshots(args) => commands::screenshots::run(args, settings).await,
        Command::Capture(args) => commands::capture::run(args).await,
        Command::Search(args) => commands::search::run(args, settings).await,
        Command::Collections(args) => commands::collections::run(args, settings).await,
        Command::Feedback(args) => commands::feedback::run(args, settings).await,
        Command::Metadata(args) => commands::metadata::run(args, settings).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
