//! Chat request construction: coaching prompt, profile context and history.

use std::fmt::Write;

use swingcoach_types::chat::ChatMessage;
use swingcoach_types::config::CoachConfig;
use swingcoach_types::llm::{CompletionRequest, Message, MessageRole};
use swingcoach_types::profile::SwingProfile;

use crate::catalog::DrillCatalog;

/// Built-in coaching persona, used unless `[chat].system_prompt` overrides it.
pub const COACH_SYSTEM_PROMPT: &str = r#"You are an experienced, encouraging golf swing coach talking with one student over chat.

How you coach:
- Find the root cause before prescribing fixes; a slice is a symptom, an open clubface or out-to-in path is a cause.
- Give one priority at a time and explain how it should feel, not only what it looks like.
- Recommend drills from the drill catalog below by name when one fits.
- When the student shares a swing video, describe what you observe in setup, backswing, transition, impact and finish, then name the single biggest fault.
- Build on what you already know about the student instead of starting over.
- Keep replies short enough to read between shots."#;

/// Number of past session records shown in the profile context.
const RECENT_SESSIONS: usize = 3;

/// Build the streaming request for a chat turn.
///
/// `history` ends with the new user turn. Only the last
/// `config.chat.history_turns` messages with content are sent, and the
/// window always starts on a user turn.
pub fn build_chat_request(
    config: &CoachConfig,
    profile: &SwingProfile,
    catalog: &dyn DrillCatalog,
    history: &[ChatMessage],
) -> CompletionRequest {
    let base = config
        .chat
        .system_prompt
        .as_deref()
        .unwrap_or(COACH_SYSTEM_PROMPT);

    let mut system = String::from(base);
    system.push_str("\n\n## What you know about this student\n");
    system.push_str(&profile_context(profile, catalog));
    system.push_str("\n\n## Drill catalog\n");
    for drill in catalog.drills() {
        let _ = write!(system, "- {} ({})", drill.name, drill.id);
        if !drill.addresses.is_empty() {
            let _ = write!(system, ": helps with {}", drill.addresses.join(", "));
        }
        system.push('\n');
    }

    CompletionRequest {
        system,
        messages: history_window(history, config.chat.history_turns),
        max_tokens: config.relay.max_tokens,
        stream: true,
    }
}

/// Plain-text rendering of the profile for the system prompt.
pub fn profile_context(profile: &SwingProfile, catalog: &dyn DrillCatalog) -> String {
    if profile.is_empty() {
        return "Nothing yet. This is a new student.".to_string();
    }

    let mut out = String::new();
    if !profile.summary.is_empty() {
        let _ = writeln!(out, "Summary: {}", profile.summary);
    }
    if !profile.prioritized_issues.is_empty() {
        let ranked: Vec<String> = profile
            .prioritized_issues
            .iter()
            .map(|i| format!("{} ({})", i.name, i.priority))
            .collect();
        let _ = writeln!(out, "Priorities: {}", ranked.join(", "));
    } else if !profile.identified_issues.is_empty() {
        let issues: Vec<&str> = profile.identified_issues.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Known issues: {}", issues.join(", "));
    }
    if !profile.strengths.is_empty() {
        let strengths: Vec<&str> = profile.strengths.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Strengths: {}", strengths.join(", "));
    }
    if !profile.current_focus_areas.is_empty() {
        let _ = writeln!(out, "Working on: {}", profile.current_focus_areas.join(", "));
    }
    if !profile.recommended_drills.is_empty() {
        let drills: Vec<String> = profile
            .recommended_drills
            .iter()
            .map(|d| {
                let name = catalog
                    .get(&d.drill_id)
                    .map(|drill| drill.name.as_str())
                    .unwrap_or(d.drill_id.as_str());
                format!("{name} [{}]", d.priority)
            })
            .collect();
        let _ = writeln!(out, "Assigned drills: {}", drills.join(", "));
    }
    let history = profile.session_history();
    if !history.is_empty() {
        out.push_str("Recent sessions:\n");
        for record in history.iter().rev().take(RECENT_SESSIONS) {
            let _ = writeln!(
                out,
                "- {}: {} (score {})",
                record.recorded_at.format("%Y-%m-%d"),
                record.root_cause,
                record.score
            );
        }
    }

    out.trim_end().to_string()
}

fn history_window(history: &[ChatMessage], max_turns: usize) -> Vec<Message> {
    let relevant: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| m.has_content())
        .collect();
    let start = relevant.len().saturating_sub(max_turns.max(1));

    relevant[start..]
        .iter()
        .skip_while(|m| m.role != MessageRole::User)
        .map(|m| Message {
            role: m.role,
            content: m.text_with_attachments(),
        })
        .collect()
}
