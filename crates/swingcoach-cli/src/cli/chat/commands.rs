//! Slash commands for the chat loop.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Start a new conversation.
    New,
    /// Show the messages of the current conversation.
    History,
    /// Show the current swing profile.
    Profile,
    /// Attach a video reference to the next message.
    Video(String),
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(' ') {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/history" => ChatCommand::History,
        "/profile" => ChatCommand::Profile,
        "/video" if arg.is_empty() => ChatCommand::Unknown("/video requires a reference".to_string()),
        "/video" => ChatCommand::Video(arg.to_string()),
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Help text listing all commands.
pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/new", "Start a new conversation"),
        ("/history", "Show this conversation"),
        ("/profile", "Show what the coach knows about you"),
        ("/video <ref>", "Attach a swing video to your next message"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat session"),
    ];
    let mut text = format!("\n  {}\n\n", style("Available commands:").bold());
    for (command, description) in rows {
        text.push_str(&format!("  {:<14} {}\n", style(command).cyan(), description));
    }
    text.push_str(&format!(
        "\n  {}\n",
        style("Ctrl+C cancels a reply in progress, Ctrl+D exits.").dim()
    ));
    text
}
