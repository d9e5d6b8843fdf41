//! Typed view over the loosely-shaped JSON returned by the extraction call.
//!
//! Every field is an optional slot. Unknown keys are ignored, mistyped
//! values leave their slot empty, and records with an unrecognised priority
//! are dropped instead of being stored with a default.
//!
//! Keys are accepted in camelCase (as the prompt requests) and snake_case.

use serde_json::{Map, Value};
use tracing::debug;

use swingcoach_types::profile::{Priority, PrioritizedIssue, Score};

/// Score used when a session record omits one or sends a non-number.
pub const DEFAULT_SESSION_SCORE: i64 = 5;

/// Incoming drill recommendation, not yet validated against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillSuggestion {
    pub drill_id: String,
    pub reason: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub root_cause: String,
    pub assigned_drill: String,
    pub score: Score,
}

/// One extraction result. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub summary: Option<String>,
    pub identified_issues: Option<Vec<String>>,
    pub prioritized_issues: Option<Vec<PrioritizedIssue>>,
    pub recommended_drills: Option<Vec<DrillSuggestion>>,
    pub strengths: Option<Vec<String>>,
    pub current_focus_areas: Option<Vec<String>>,
    pub progress_notes: Vec<String>,
    pub session: Option<SessionUpdate>,
}

impl ProfileUpdate {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let mut progress_notes = Vec::new();
        if let Some(note) = field(object, &["progressNote", "progress_note"]).and_then(text) {
            progress_notes.push(note);
        }
        if let Some(notes) = field(object, &["progressNotes", "progress_notes"]).and_then(text_list) {
            progress_notes.extend(notes);
        }

        Self {
            summary: field(object, &["summary"]).and_then(text),
            identified_issues: field(object, &["identifiedIssues", "identified_issues"])
                .and_then(text_list),
            prioritized_issues: field(object, &["prioritizedIssues", "prioritized_issues"])
                .and_then(|v| records(v, prioritized_issue)),
            recommended_drills: field(object, &["recommendedDrills", "recommended_drills"])
                .and_then(|v| records(v, drill_suggestion)),
            strengths: field(object, &["strengths"]).and_then(text_list),
            current_focus_areas: field(object, &["currentFocusAreas", "current_focus_areas"])
                .and_then(text_list),
            progress_notes,
            session: field(object, &["sessionRecord", "session_record", "session"])
                .and_then(session_update),
        }
    }

    /// Whether the payload carries nothing mergeable.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

/// Non-empty trimmed string.
fn text(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Array of strings (non-strings skipped). A lone string counts as one entry.
fn text_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(text).collect()),
        Value::String(_) => text(value).map(|s| vec![s]),
        _ => None,
    }
}

fn records<T>(value: &Value, parse: fn(&Map<String, Value>) -> Option<T>) -> Option<Vec<T>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(parse)
            .collect(),
    )
}

fn priority(object: &Map<String, Value>) -> Option<Priority> {
    let raw = field(object, &["priority"])?.as_str()?;
    match raw.parse() {
        Ok(priority) => Some(priority),
        Err(_) => {
            debug!(priority = raw, "discarding record with unknown priority");
            None
        }
    }
}

fn prioritized_issue(object: &Map<String, Value>) -> Option<PrioritizedIssue> {
    Some(PrioritizedIssue {
        name: field(object, &["name", "issue"]).and_then(text)?,
        priority: priority(object)?,
    })
}

fn drill_suggestion(object: &Map<String, Value>) -> Option<DrillSuggestion> {
    Some(DrillSuggestion {
        drill_id: field(object, &["drillID", "drillId", "drill_id", "id"]).and_then(text)?,
        reason: field(object, &["reason"]).and_then(text).unwrap_or_default(),
        priority: priority(object)?,
    })
}

fn session_update(value: &Value) -> Option<SessionUpdate> {
    let object = value.as_object()?;
    let raw_score = field(object, &["score"]).and_then(score).unwrap_or(DEFAULT_SESSION_SCORE);
    Some(SessionUpdate {
        root_cause: field(object, &["rootCause", "root_cause"])
            .and_then(text)
            .unwrap_or_default(),
        assigned_drill: field(object, &["assignedDrill", "assigned_drill"])
            .and_then(text)
            .unwrap_or_default(),
        score: Score::new(raw_score),
    })
}

/// Integer, float (rounded) or numeric string.
fn score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}
