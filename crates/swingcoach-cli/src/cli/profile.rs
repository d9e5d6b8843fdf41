//! `swingcoach profile` -- inspect or reset the swing profile.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use swingcoach_core::catalog::DrillCatalog;
use swingcoach_types::profile::SwingProfile;

use crate::cli::format_relative_time;
use crate::state::AppState;

/// Print the current profile.
pub async fn show_profile(state: &AppState, json: bool) -> Result<()> {
    let profile = state.coordinator.profile().snapshot().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    print!("{}", render_profile(&profile, state.catalog.as_ref()));
    Ok(())
}

/// Reset the profile to empty, with confirmation unless forced.
pub async fn reset_profile(state: &AppState, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "{} everything the coach has learned about your swing?",
                style("Forget").red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.coordinator.profile().reset().await?;

    if json {
        println!("{}", serde_json::json!({"reset": true}));
    } else {
        println!("  {} Swing profile reset.", style("✓").green().bold());
    }
    Ok(())
}

/// Styled multi-section rendering of a profile.
pub fn render_profile(profile: &SwingProfile, catalog: &dyn DrillCatalog) -> String {
    let mut out = String::from("\n");

    if profile.is_empty() {
        out.push_str(&format!(
            "  {} The coach doesn't know anything about your swing yet. Start with {}.\n\n",
            style("i").blue().bold(),
            style("swingcoach chat").yellow()
        ));
        return out;
    }

    out.push_str(&format!("  {}\n", style("Swing profile").cyan().bold()));
    if let Some(updated_at) = &profile.updated_at {
        out.push_str(&format!(
            "  {}\n",
            style(format!("updated {}", format_relative_time(updated_at))).dim()
        ));
    }
    out.push('\n');

    if !profile.summary.is_empty() {
        out.push_str(&format!("  {}\n\n", profile.summary));
    }

    section(&mut out, "Focus areas", profile.current_focus_areas.iter().cloned());
    section(
        &mut out,
        "Priority issues",
        profile
            .prioritized_issues
            .iter()
            .map(|issue| format!("{} {}", issue.name, style(format!("({})", issue.priority)).dim())),
    );
    section(&mut out, "Issues seen", profile.identified_issues.iter().cloned());
    section(&mut out, "Strengths", profile.strengths.iter().cloned());
    section(
        &mut out,
        "Recommended drills",
        profile.recommended_drills.iter().map(|drill| {
            let name = catalog
                .get(&drill.drill_id)
                .map(|d| d.name.as_str())
                .unwrap_or(drill.drill_id.as_str());
            if drill.reason.is_empty() {
                format!("{name} {}", style(format!("({})", drill.priority)).dim())
            } else {
                format!(
                    "{name} {} {}",
                    style(format!("({})", drill.priority)).dim(),
                    style(format!("- {}", drill.reason)).dim()
                )
            }
        }),
    );
    section(
        &mut out,
        "Recent sessions",
        profile.session_history().iter().rev().map(|session| {
            format!(
                "{}/10  {} {}",
                session.score.value(),
                session.root_cause,
                style(format!("-> {}", session.assigned_drill)).dim()
            )
        }),
    );
    section(
        &mut out,
        "Progress notes",
        profile.progress_notes.iter().rev().take(5).map(|note| {
            format!(
                "{} {}",
                style(note.timestamp.format("%Y-%m-%d")).dim(),
                note.text
            )
        }),
    );

    out
}

fn section(out: &mut String, heading: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("  {}\n", style(heading).bold()));
    for item in items {
        out.push_str(&format!("    • {item}\n"));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use swingcoach_core::catalog::StaticDrillCatalog;
    use swingcoach_types::profile::{Priority, RecommendedDrill};

    #[test]
    fn empty_profile_prompts_to_chat() {
        let rendered = render_profile(&SwingProfile::default(), &StaticDrillCatalog::builtin());
        assert!(rendered.contains("doesn't know anything"));
    }

    #[test]
    fn drills_render_with_catalog_names() {
        console::set_colors_enabled(false);
        let mut profile = SwingProfile::default();
        profile.summary = "Over the top move.".to_string();
        profile.recommended_drills.push(RecommendedDrill {
            drill_id: "gate-drill".to_string(),
            reason: "path".to_string(),
            priority: Priority::High,
        });
        profile.strengths.insert("tempo".to_string());

        let catalog = StaticDrillCatalog::builtin();
        let rendered = render_profile(&profile, &catalog);
        let name = &catalog.get("gate-drill").unwrap().name;
        assert!(rendered.contains(name.as_str()));
        assert!(rendered.contains("(high)"));
        assert!(rendered.contains("Strengths"));
        assert!(!rendered.contains("Recent sessions"));
    }
}
