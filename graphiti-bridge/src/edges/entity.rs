//! EntityEdge — bi-temporal factual relationship between EntityNodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fact returned by free-text search.
///
/// - **Valid time** (`valid_at` / `invalid_at`): when the fact was true in the real world.
/// - **Transaction time** (`created_at` / `expired_at`): when the edge existed in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEdge {
    /// Identifier assigned by the graph service.
    pub uuid: String,
    /// Relationship label (e.g. "WORKS_AT").
    #[serde(default)]
    pub name: String,
    /// Human-readable fact string.
    pub fact: String,
    /// UUID of the source EntityNode.
    #[serde(default)]
    pub source_node_uuid: Option<String>,
    /// UUID of the target EntityNode.
    #[serde(default)]
    pub target_node_uuid: Option<String>,
    /// When the fact became true in the real world (valid-time start).
    #[serde(default)]
    pub valid_at: Option<DateTime<Utc>>,
    /// When the fact ceased to be true in the real world (valid-time end).
    #[serde(default)]
    pub invalid_at: Option<DateTime<Utc>>,
    /// When this edge was created in the graph (transaction-time start).
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When this edge was superseded in the graph (transaction-time end).
    #[serde(default)]
    pub expired_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub group_id: Option<String>,
}

impl EntityEdge {
    /// A fact with only the required fields set.
    pub fn new(uuid: impl Into<String>, fact: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: String::new(),
            fact: fact.into(),
            source_node_uuid: None,
            target_node_uuid: None,
            valid_at: None,
            invalid_at: None,
            created_at: None,
            expired_at: None,
            group_id: None,
        }
    }

    /// Whether the fact held at `at` according to its valid-time window.
    ///
    /// Open-ended bounds are treated as unbounded.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        let started = self.valid_at.map_or(true, |v| v <= at);
        let not_ended = self.invalid_at.map_or(true, |i| at < i);
        started && not_ended
    }
}
