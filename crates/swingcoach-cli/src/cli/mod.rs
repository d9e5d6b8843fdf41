//! CLI command definitions for the `swingcoach` binary.

pub mod chat;
pub mod conversations;
pub mod profile;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Conversational golf swing coach.
#[derive(Parser)]
#[command(name = "swingcoach", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "SWINGCOACH_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the coach. Resumes the most recent conversation.
    Chat {
        /// Start a new conversation instead of resuming.
        #[arg(long)]
        new: bool,

        /// Resume a specific conversation by ID.
        #[arg(long, conflicts_with = "new")]
        conversation: Option<Uuid>,

        /// Attach a swing video reference to the first message.
        #[arg(long, value_name = "REF")]
        video: Option<String>,
    },

    /// Inspect or reset the swing profile.
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// List conversations.
    #[command(alias = "ls")]
    Conversations,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show what the coach knows about you.
    Show,

    /// Forget everything and start from an empty profile.
    Reset {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

/// Relative time like "3h ago".
pub(crate) fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// Spinner on stderr with a cyan glyph.
pub(crate) fn spinner(message: impl Into<std::borrow::Cow<'static, str>>) -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
