//! `swingcoach conversations` -- list stored conversations.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::cli::format_relative_time;
use crate::state::AppState;

pub async fn list_conversations(state: &AppState, json: bool) -> Result<()> {
    let conversations = state.coordinator.conversations();
    let active = state.coordinator.active_conversation_id().await;

    if json {
        let listing: Vec<serde_json::Value> = conversations
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "title": c.title,
                    "summary": c.summary,
                    "messages": c.len(),
                    "updated_at": c.updated_at,
                    "active": Some(c.id) == active,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with: {}",
            style("i").blue().bold(),
            style("swingcoach chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Summary").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for conversation in &conversations {
        let marker = if Some(conversation.id) == active {
            Cell::new("●").fg(Color::Green)
        } else {
            Cell::new("")
        };
        let id = conversation.id.to_string();
        table.add_row(vec![
            marker,
            Cell::new(&id[..8]).fg(Color::DarkGrey),
            Cell::new(&conversation.title).fg(Color::Cyan),
            Cell::new(conversation.summary.as_deref().unwrap_or("")),
            Cell::new(conversation.len()),
            Cell::new(format_relative_time(&conversation.updated_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style(format!(
            "Resume one with: swingcoach chat --conversation <ID>  ({} total)",
            conversations.len()
        ))
        .dim()
    );
    println!();
    Ok(())
}
