//! Swing profile types for swingcoach.
//!
//! The `SwingProfile` is the durable, incrementally merged record of what the
//! coach knows about a golfer: issues, strengths, recommended drills, focus
//! areas, progress notes and a bounded session history.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of session records kept; oldest are evicted first.
pub const MAX_SESSION_HISTORY: usize = 10;

/// Lowest and highest session score.
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// Priority of an issue or drill recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("invalid priority: '{other}'")),
        }
    }
}

/// A session score, always within `[MIN_SCORE, MAX_SCORE]`.
///
/// Out-of-range input is clamped at construction, including on deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub fn new(raw: i64) -> Self {
        Self(raw.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<i64> for Score {
    fn from(raw: i64) -> Self {
        Score::new(raw)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, MAX_SCORE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizedIssue {
    pub name: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedDrill {
    pub drill_id: String,
    pub reason: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressNote {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// One analysed practice session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub root_cause: String,
    pub assigned_drill: String,
    pub score: Score,
    pub recorded_at: DateTime<Utc>,
}

/// The per-user coaching memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingProfile {
    pub summary: String,
    pub identified_issues: BTreeSet<String>,
    pub prioritized_issues: Vec<PrioritizedIssue>,
    pub recommended_drills: Vec<RecommendedDrill>,
    pub strengths: BTreeSet<String>,
    pub current_focus_areas: Vec<String>,
    pub progress_notes: Vec<ProgressNote>,
    session_history: Vec<SessionRecord>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SwingProfile {
    /// Session records, oldest first.
    pub fn session_history(&self) -> &[SessionRecord] {
        &self.session_history
    }

    /// Append a session record, evicting the oldest beyond `MAX_SESSION_HISTORY`.
    pub fn push_session(&mut self, record: SessionRecord) {
        self.session_history.push(record);
        if self.session_history.len() > MAX_SESSION_HISTORY {
            let excess = self.session_history.len() - MAX_SESSION_HISTORY;
            self.session_history.drain(..excess);
        }
    }

    /// Whether nothing has been learned yet.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.identified_issues.is_empty()
            && self.prioritized_issues.is_empty()
            && self.recommended_drills.is_empty()
            && self.strengths.is_empty()
            && self.current_focus_areas.is_empty()
            && self.progress_notes.is_empty()
            && self.session_history.is_empty()
    }

    /// Whether a drill id is currently recommended.
    pub fn recommends(&self, drill_id: &str) -> bool {
        self.recommended_drills.iter().any(|d| d.drill_id == drill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cause: &str, score: i64) -> SessionRecord {
        SessionRecord {
            root_cause: cause.to_string(),
            assigned_drill: "gate-drill".to_string(),
            score: Score::new(score),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_score_clamped_on_construction() {
        assert_eq!(Score::new(15).value(), 10);
        assert_eq!(Score::new(0).value(), 1);
        assert_eq!(Score::new(-4).value(), 1);
        assert_eq!(Score::new(7).value(), 7);
    }

    #[test]
    fn test_score_clamped_on_deserialize() {
        let score: Score = serde_json::from_str("42").unwrap();
        assert_eq!(score.value(), 10);
        assert_eq!(serde_json::to_string(&Score::new(3)).unwrap(), "3");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_session_history_evicts_oldest() {
        let mut profile = SwingProfile::default();
        for i in 0..10 {
            profile.push_session(record(&format!("cause-{i}"), 5));
        }
        assert_eq!(profile.session_history().len(), 10);

        profile.push_session(record("cause-10", 6));
        let history = profile.session_history();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].root_cause, "cause-1");
        assert_eq!(history[9].root_cause, "cause-10");
    }

    #[test]
    fn test_default_profile_is_empty() {
        let profile = SwingProfile::default();
        assert!(profile.is_empty());
        let parsed: SwingProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, profile);
    }
}
