//! Welcome banner for chat sessions.

use console::style;

/// Banner shown when a chat session starts.
pub fn welcome_banner(title: &str, conversation_id: &str, relay_url: &str, resumed: bool) -> String {
    let mut text = String::new();
    text.push('\n');
    text.push_str(&format!("  ⛳ {}\n", style("Swing Coach").cyan().bold()));
    text.push_str(&format!(
        "  {}\n\n",
        style("Describe your swing, your misses, or attach a video.").dim()
    ));
    let label = if resumed { "Resuming:" } else { "Conversation:" };
    text.push_str(&format!(
        "  {}  {} {}\n",
        style(label).bold(),
        title,
        style(format!("({})", &conversation_id[..8.min(conversation_id.len())])).dim()
    ));
    text.push_str(&format!("  {}  {}\n\n", style("Relay:").bold(), style(relay_url).dim()));
    text.push_str(&format!(
        "  {}\n  {}\n\n",
        style("Type /help for commands, Ctrl+D to exit").dim(),
        style("---").dim()
    ));
    text
}
