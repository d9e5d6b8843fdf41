//! Prompt construction for the profile extraction call.

use std::fmt::Write;

use swingcoach_types::chat::ChatMessage;
use swingcoach_types::config::MemoryConfig;
use swingcoach_types::llm::{CompletionRequest, Message, MessageRole};
use swingcoach_types::profile::SwingProfile;

use super::merge::ExchangeMode;
use crate::catalog::DrillCatalog;

/// System prompt for the extraction call.
const EXTRACTION_SYSTEM_PROMPT: &str = r#"You maintain a golf student's coaching profile. Read the latest exchange between the student and their swing coach and report what should be remembered.

Return ONE JSON object and nothing else. Every field is optional; omit a field when the exchange says nothing new about it.
- "summary": string, a 1-3 sentence picture of the student's swing as it stands now
- "identifiedIssues": array of short issue names (e.g. "slice", "early extension")
- "prioritizedIssues": array of {"name": string, "priority": "high" | "medium" | "low"}, the full ranked list
- "recommendedDrills": array of {"drillID": string, "reason": string, "priority": "high" | "medium" | "low"}; drillID MUST be one of the catalog ids listed below
- "strengths": array of short strength names
- "currentFocusAreas": array of what the student should work on next
- "progressNote": string, one sentence on progress made in this exchange
- "sessionRecord": {"rootCause": string, "assignedDrill": string, "score": integer 1-10}; only when a swing was actually evaluated

Rules:
1. Use only facts stated in the conversation. Do not invent swing faults.
2. Keep names short and consistent with the existing profile.
3. Never include greetings or small talk."#;

/// Progress notes and session records shown to the extractor.
const RECENT_NOTES: usize = 3;
const RECENT_SESSIONS: usize = 3;

/// Upper bound on entries rendered from any other profile list.
const MAX_LIST_ITEMS: usize = 20;

const TEXT_MODE_RULE: &str = "This was a text-only exchange. In \"recommendedDrills\" list only drills newly suggested in this exchange; existing recommendations are kept automatically. Do not send a sessionRecord unless the coach scored a swing.";

const VIDEO_MODE_RULE: &str = "This exchange included a swing video analysis. \"recommendedDrills\" must be the COMPLETE current list: it replaces the previous recommendations, so drop drills for resolved issues. Include a sessionRecord for the analysed swing.";

/// Build the extraction request from the current profile and the newest turns.
///
/// Only the last `config.max_turns` turns are sent, each truncated to
/// `config.max_chars_per_turn` characters.
pub fn build_extraction_request(
    profile: &SwingProfile,
    tail: &[ChatMessage],
    mode: ExchangeMode,
    catalog: &dyn DrillCatalog,
    config: &MemoryConfig,
) -> CompletionRequest {
    let mut body = String::new();

    body.push_str("Current profile:\n");
    body.push_str(&profile_digest(profile));

    body.push_str("\n\nDrill catalog (id: name):\n");
    for drill in catalog.drills() {
        body.push_str(&format!("- {}: {}\n", drill.id, drill.name));
    }

    body.push_str("\nLatest exchange:\n");
    for message in recent_turns(tail, config.max_turns) {
        let speaker = match message.role {
            MessageRole::User => "Student",
            MessageRole::Assistant => "Coach",
        };
        body.push_str(&format!(
            "{speaker}: {}\n",
            truncate_chars(&message.text_with_attachments(), config.max_chars_per_turn)
        ));
    }

    body.push('\n');
    body.push_str(match mode {
        ExchangeMode::Text => TEXT_MODE_RULE,
        ExchangeMode::Video => VIDEO_MODE_RULE,
    });

    CompletionRequest {
        system: EXTRACTION_SYSTEM_PROMPT.to_string(),
        messages: vec![Message::user(body)],
        max_tokens: config.max_tokens,
        stream: false,
    }
}

/// Compact view of the profile with every list bounded, so the request
/// does not grow with the number of past exchanges.
fn profile_digest(profile: &SwingProfile) -> String {
    if profile.is_empty() {
        return "(empty)".to_string();
    }

    let mut out = String::new();
    if !profile.summary.is_empty() {
        let _ = writeln!(out, "summary: {}", profile.summary);
    }
    list_line(&mut out, "identifiedIssues", profile.identified_issues.iter().cloned());
    list_line(
        &mut out,
        "prioritizedIssues",
        profile
            .prioritized_issues
            .iter()
            .map(|i| format!("{} ({})", i.name, i.priority)),
    );
    list_line(
        &mut out,
        "recommendedDrills",
        profile
            .recommended_drills
            .iter()
            .map(|d| format!("{} ({})", d.drill_id, d.priority)),
    );
    list_line(&mut out, "strengths", profile.strengths.iter().cloned());
    list_line(&mut out, "currentFocusAreas", profile.current_focus_areas.iter().cloned());

    let notes = recent(&profile.progress_notes, RECENT_NOTES);
    if !notes.is_empty() {
        out.push_str("recent progress notes:\n");
        for note in notes {
            let _ = writeln!(out, "- {}: {}", note.timestamp.format("%Y-%m-%d"), note.text);
        }
    }
    let sessions = recent(profile.session_history(), RECENT_SESSIONS);
    if !sessions.is_empty() {
        out.push_str("recent sessions:\n");
        for record in sessions {
            let _ = writeln!(
                out,
                "- {}: {} -> {} (score {})",
                record.recorded_at.format("%Y-%m-%d"),
                record.root_cause,
                record.assigned_drill,
                record.score
            );
        }
    }

    out.trim_end().to_string()
}

fn list_line(out: &mut String, label: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.take(MAX_LIST_ITEMS).collect();
    if !items.is_empty() {
        let _ = writeln!(out, "{label}: {}", items.join(", "));
    }
}

fn recent<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// The last `max_turns` messages, oldest first.
pub fn recent_turns(messages: &[ChatMessage], max_turns: usize) -> &[ChatMessage] {
    let start = messages.len().saturating_sub(max_turns);
    &messages[start..]
}

/// Truncate to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
