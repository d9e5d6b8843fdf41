//! Drill catalog.
//!
//! Recommendations coming back from the model are validated against the
//! catalog; unknown drill ids are dropped during the profile merge.

use std::collections::HashMap;

use swingcoach_types::catalog::Drill;

/// Read-only lookup of known drills.
pub trait DrillCatalog: Send + Sync {
    fn get(&self, drill_id: &str) -> Option<&Drill>;

    /// All drills in presentation order.
    fn drills(&self) -> &[Drill];

    fn contains(&self, drill_id: &str) -> bool {
        self.get(drill_id).is_some()
    }
}

/// In-memory catalog built from a fixed drill list.
#[derive(Debug, Clone)]
pub struct StaticDrillCatalog {
    drills: Vec<Drill>,
    index: HashMap<String, usize>,
}

impl StaticDrillCatalog {
    /// Build a catalog. Later duplicates of an id are ignored.
    pub fn new(drills: Vec<Drill>) -> Self {
        let mut unique = Vec::with_capacity(drills.len());
        let mut index = HashMap::with_capacity(drills.len());
        for drill in drills {
            if index.contains_key(&drill.id) {
                tracing::warn!(drill_id = %drill.id, "duplicate drill id in catalog, ignoring");
                continue;
            }
            index.insert(drill.id.clone(), unique.len());
            unique.push(drill);
        }
        Self {
            drills: unique,
            index,
        }
    }

    /// The drills shipped with the client.
    pub fn builtin() -> Self {
        Self::new(builtin_drills())
    }

    pub fn len(&self) -> usize {
        self.drills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drills.is_empty()
    }
}

impl DrillCatalog for StaticDrillCatalog {
    fn get(&self, drill_id: &str) -> Option<&Drill> {
        self.index.get(drill_id).map(|&i| &self.drills[i])
    }

    fn drills(&self) -> &[Drill] {
        &self.drills
    }
}

fn drill(id: &str, name: &str, addresses: &[&str]) -> Drill {
    Drill {
        id: id.to_string(),
        name: name.to_string(),
        addresses: addresses.iter().map(|a| a.to_string()).collect(),
    }
}

fn builtin_drills() -> Vec<Drill> {
    vec![
        drill(
            "alignment-stick-path",
            "Alignment stick swing path",
            &["over the top", "out-to-in path", "slice"],
        ),
        drill(
            "towel-under-arms",
            "Towel under both arms",
            &["disconnected arms", "chicken wing", "flying elbow"],
        ),
        drill(
            "pump-drill",
            "Pump drill",
            &["casting", "early release", "over the top"],
        ),
        drill(
            "split-grip",
            "Split-grip swings",
            &["flipping", "early release", "scooping"],
        ),
        drill(
            "feet-together",
            "Feet-together swings",
            &["balance", "sway", "overswinging"],
        ),
        drill(
            "impact-bag",
            "Impact bag",
            &["flipping", "weak impact position", "scooping"],
        ),
        drill(
            "gate-drill",
            "Putting gate drill",
            &["putter face control", "start line"],
        ),
        drill(
            "step-through",
            "Step-through drill",
            &["weight stuck on back foot", "hanging back", "poor weight transfer"],
        ),
        drill(
            "l-to-l",
            "L-to-L half swings",
            &["inconsistent contact", "wrist hinge", "clubface control"],
        ),
        drill(
            "pause-at-top",
            "Pause at the top",
            &["rushed transition", "tempo", "over the top"],
        ),
    ]
}
