//! Drill catalog entry type.

use serde::{Deserialize, Serialize};

/// A practice drill the coach may recommend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drill {
    /// Stable identifier referenced by `RecommendedDrill::drill_id`.
    pub id: String,
    pub name: String,
    /// Issues this drill addresses, for prompt context.
    #[serde(default)]
    pub addresses: Vec<String>,
}
