//! Pure merge of a [`ProfileUpdate`] into a [`SwingProfile`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use swingcoach_types::profile::{ProgressNote, RecommendedDrill, SessionRecord, SwingProfile};

use super::payload::{DrillSuggestion, ProfileUpdate};
use crate::catalog::DrillCatalog;

/// Kind of exchange that produced an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeMode {
    /// Text-only chat turn. Drill recommendations only accumulate.
    #[default]
    Text,
    /// Swing video analysis. The drill list is authoritative and replaces
    /// the previous one.
    Video,
}

/// Merge `update` into a copy of `current`.
pub fn merge_profile(
    current: &SwingProfile,
    update: ProfileUpdate,
    mode: ExchangeMode,
    catalog: &dyn DrillCatalog,
    now: DateTime<Utc>,
) -> SwingProfile {
    let mut next = current.clone();

    if let Some(summary) = update.summary {
        next.summary = summary;
    }

    if let Some(issues) = update.identified_issues {
        next.identified_issues.extend(issues);
    }
    if let Some(strengths) = update.strengths {
        next.strengths.extend(strengths);
    }

    if let Some(prioritized) = update.prioritized_issues.filter(|p| !p.is_empty()) {
        next.prioritized_issues = prioritized;
    }

    if let Some(suggestions) = update.recommended_drills {
        merge_drills(&mut next, suggestions, mode, catalog);
    }

    if let Some(focus) = update.current_focus_areas.filter(|f| !f.is_empty()) {
        next.current_focus_areas = focus;
    }

    next.progress_notes
        .extend(update.progress_notes.into_iter().map(|text| ProgressNote {
            timestamp: now,
            text,
        }));

    if let Some(session) = update.session.filter(|s| !s.root_cause.is_empty()) {
        next.push_session(SessionRecord {
            root_cause: session.root_cause,
            assigned_drill: session.assigned_drill,
            score: session.score,
            recorded_at: now,
        });
    }

    next.updated_at = Some(now);
    next
}

fn merge_drills(
    profile: &mut SwingProfile,
    suggestions: Vec<DrillSuggestion>,
    mode: ExchangeMode,
    catalog: &dyn DrillCatalog,
) {
    let mut seen = HashSet::new();
    let valid: Vec<RecommendedDrill> = suggestions
        .into_iter()
        .filter(|s| {
            let known = catalog.contains(&s.drill_id);
            if !known {
                debug!(drill_id = %s.drill_id, "dropping unknown drill recommendation");
            }
            known && seen.insert(s.drill_id.clone())
        })
        .map(|s| RecommendedDrill {
            drill_id: s.drill_id,
            reason: s.reason,
            priority: s.priority,
        })
        .collect();

    match mode {
        // An all-unknown list is noise, not a retraction.
        ExchangeMode::Video if !valid.is_empty() => profile.recommended_drills = valid,
        ExchangeMode::Video => {}
        ExchangeMode::Text => {
            for drill in valid {
                if !profile.recommends(&drill.drill_id) {
                    profile.recommended_drills.push(drill);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticDrillCatalog;
    use crate::memory::payload::SessionUpdate;
    use swingcoach_types::profile::{MAX_SESSION_HISTORY, Priority, PrioritizedIssue, Score};

    fn catalog() -> StaticDrillCatalog {
        StaticDrillCatalog::builtin()
    }

    fn suggestion(id: &str) -> DrillSuggestion {
        DrillSuggestion {
            drill_id: id.to_string(),
            reason: format!("because {id}"),
            priority: Priority::Medium,
        }
    }

    fn recommended(id: &str) -> RecommendedDrill {
        RecommendedDrill {
            drill_id: id.to_string(),
            reason: "existing".to_string(),
            priority: Priority::High,
        }
    }

    fn merge(current: &SwingProfile, update: ProfileUpdate, mode: ExchangeMode) -> SwingProfile {
        merge_profile(current, update, mode, &catalog(), Utc::now())
    }

    fn drill_ids(profile: &SwingProfile) -> Vec<&str> {
        profile
            .recommended_drills
            .iter()
            .map(|d| d.drill_id.as_str())
            .collect()
    }

    #[test]
    fn issues_are_unioned() {
        let mut current = SwingProfile::default();
        current.identified_issues.insert("slice".into());

        let update = ProfileUpdate {
            identified_issues: Some(vec!["slice".into(), "hook".into()]),
            ..ProfileUpdate::default()
        };
        let merged = merge(&current, update, ExchangeMode::Text);

        let issues: Vec<&str> = merged.identified_issues.iter().map(String::as_str).collect();
        assert_eq!(issues, vec!["hook", "slice"]);
    }

    #[test]
    fn empty_summary_and_focus_keep_existing() {
        let mut current = SwingProfile::default();
        current.summary = "Steep".into();
        current.current_focus_areas = vec!["grip".into()];

        let update = ProfileUpdate {
            current_focus_areas: Some(vec![]),
            ..ProfileUpdate::default()
        };
        let merged = merge(&current, update, ExchangeMode::Text);
        assert_eq!(merged.summary, "Steep");
        assert_eq!(merged.current_focus_areas, vec!["grip"]);

        let update = ProfileUpdate {
            summary: Some("Shallower now".into()),
            current_focus_areas: Some(vec!["tempo".into()]),
            ..ProfileUpdate::default()
        };
        let merged = merge(&merged, update, ExchangeMode::Text);
        assert_eq!(merged.summary, "Shallower now");
        assert_eq!(merged.current_focus_areas, vec!["tempo"]);
    }

    #[test]
    fn prioritized_issues_replace_when_non_empty() {
        let mut current = SwingProfile::default();
        current.prioritized_issues = vec![PrioritizedIssue {
            name: "slice".into(),
            priority: Priority::High,
        }];

        let kept = merge(
            &current,
            ProfileUpdate {
                prioritized_issues: Some(vec![]),
                ..ProfileUpdate::default()
            },
            ExchangeMode::Text,
        );
        assert_eq!(kept.prioritized_issues.len(), 1);

        let replaced = merge(
            &current,
            ProfileUpdate {
                prioritized_issues: Some(vec![PrioritizedIssue {
                    name: "sway".into(),
                    priority: Priority::Low,
                }]),
                ..ProfileUpdate::default()
            },
            ExchangeMode::Text,
        );
        assert_eq!(replaced.prioritized_issues[0].name, "sway");
        assert_eq!(replaced.prioritized_issues.len(), 1);
    }

    #[test]
    fn text_mode_appends_new_drills_only() {
        let mut current = SwingProfile::default();
        current.recommended_drills = vec![recommended("pump-drill")];

        let update = ProfileUpdate {
            recommended_drills: Some(vec![
                suggestion("gate-drill"),
                suggestion("pump-drill"),
                suggestion("not-a-drill"),
                suggestion("gate-drill"),
            ]),
            ..ProfileUpdate::default()
        };
        let merged = merge(&current, update, ExchangeMode::Text);

        assert_eq!(drill_ids(&merged), vec!["pump-drill", "gate-drill"]);
        // Existing entry untouched.
        assert_eq!(merged.recommended_drills[0].reason, "existing");
    }

    #[test]
    fn video_mode_replaces_drills() {
        let mut current = SwingProfile::default();
        current.recommended_drills = vec![recommended("pump-drill"), recommended("gate-drill")];

        let update = ProfileUpdate {
            recommended_drills: Some(vec![suggestion("impact-bag"), suggestion("bogus")]),
            ..ProfileUpdate::default()
        };
        let merged = merge(&current, update, ExchangeMode::Video);
        assert_eq!(drill_ids(&merged), vec!["impact-bag"]);
    }

    #[test]
    fn video_mode_ignores_all_unknown_list() {
        let mut current = SwingProfile::default();
        current.recommended_drills = vec![recommended("pump-drill")];

        let update = ProfileUpdate {
            recommended_drills: Some(vec![suggestion("bogus")]),
            ..ProfileUpdate::default()
        };
        let merged = merge(&current, update, ExchangeMode::Video);
        assert_eq!(drill_ids(&merged), vec!["pump-drill"]);
    }

    #[test]
    fn progress_notes_are_appended() {
        let mut current = SwingProfile::default();
        current.progress_notes.push(ProgressNote {
            timestamp: Utc::now(),
            text: "same".into(),
        });

        let update = ProfileUpdate {
            progress_notes: vec!["same".into()],
            ..ProfileUpdate::default()
        };
        let merged = merge(&current, update, ExchangeMode::Text);
        assert_eq!(merged.progress_notes.len(), 2);
    }

    #[test]
    fn session_record_requires_root_cause() {
        let update = ProfileUpdate {
            session: Some(SessionUpdate {
                root_cause: String::new(),
                assigned_drill: "pump-drill".into(),
                score: Score::new(6),
            }),
            ..ProfileUpdate::default()
        };
        let merged = merge(&SwingProfile::default(), update, ExchangeMode::Video);
        assert!(merged.session_history().is_empty());
    }

    #[test]
    fn session_history_keeps_most_recent_ten() {
        let mut current = SwingProfile::default();
        for i in 0..MAX_SESSION_HISTORY {
            current.push_session(SessionRecord {
                root_cause: format!("cause {i}"),
                assigned_drill: String::new(),
                score: Score::new(5),
                recorded_at: Utc::now(),
            });
        }

        let update = ProfileUpdate {
            session: Some(SessionUpdate {
                root_cause: "newest".into(),
                assigned_drill: "l-to-l".into(),
                score: Score::new(15),
            }),
            ..ProfileUpdate::default()
        };
        let merged = merge(&current, update, ExchangeMode::Video);

        let history = merged.session_history();
        assert_eq!(history.len(), MAX_SESSION_HISTORY);
        assert_eq!(history[0].root_cause, "cause 1");
        assert_eq!(history[MAX_SESSION_HISTORY - 1].root_cause, "newest");
        assert_eq!(history[MAX_SESSION_HISTORY - 1].score.value(), 10);
    }

    #[test]
    fn merge_stamps_updated_at() {
        let now = Utc::now();
        let merged = merge_profile(
            &SwingProfile::default(),
            ProfileUpdate::default(),
            ExchangeMode::Text,
            &catalog(),
            now,
        );
        assert_eq!(merged.updated_at, Some(now));
    }
}
