//! swingcoach entry point.
//!
//! Binary name: `swingcoach`
//!
//! Parses CLI arguments, wires the application state, then dispatches to
//! the command handler.

mod cli;
mod state;

use clap::Parser;

use cli::{Cli, Commands, ProfileCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,swingcoach=debug",
        _ => "trace",
    };
    swingcoach_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    swingcoach_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat {
            new,
            conversation,
            video,
        } => {
            cli::chat::loop_runner::run_chat_loop(&state, new, conversation, video).await?;
        }
        Commands::Profile { action } => match action {
            ProfileCommand::Show => cli::profile::show_profile(&state, cli.json).await?,
            ProfileCommand::Reset { force } => {
                cli::profile::reset_profile(&state, force, cli.json).await?
            }
        },
        Commands::Conversations => {
            cli::conversations::list_conversations(&state, cli.json).await?;
        }
    }

    Ok(())
}
