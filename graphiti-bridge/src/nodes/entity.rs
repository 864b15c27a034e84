//! EntityNode — a real-world entity as returned by structured node search.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A real-world entity (person, place, concept) extracted from episodes.
///
/// Read-only from this crate's point of view: the graph service creates and
/// updates entities while it processes episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    pub uuid: String,
    pub name: String,
    pub summary: String,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub group_id: Option<String>,
    /// Extra properties attached by the extraction step.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}
