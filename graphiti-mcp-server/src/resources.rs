//! Read-only resources: the graph schema and this server's own counters.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

pub const SCHEMA_URI: &str = "graphiti://graph/schema";
pub const STATS_URI: &str = "graphiti://graph/stats";
pub const JSON_MIME: &str = "application/json";

/// `(uri, name, description)` of each resource.
pub const RESOURCES: &[(&str, &str, &str)] = &[
    (
        SCHEMA_URI,
        "Knowledge Graph Schema",
        "Node and relationship types of the knowledge graph",
    ),
    (
        STATS_URI,
        "Graph Statistics",
        "Activity counters observed by this server",
    ),
];

/// Counters updated by tool calls. Shared by every session of the process.
#[derive(Debug)]
pub struct ServerStats {
    started_at: DateTime<Utc>,
    episodes_added: AtomicU64,
    searches_served: AtomicU64,
    tool_errors: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub episodes_added: u64,
    pub searches_served: u64,
    pub tool_errors: u64,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            episodes_added: AtomicU64::new(0),
            searches_served: AtomicU64::new(0),
            tool_errors: AtomicU64::new(0),
        }
    }

    pub fn episode_added(&self) {
        self.episodes_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn search_served(&self) {
        self.searches_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tool_error(&self) {
        self.tool_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            episodes_added: self.episodes_added.load(Ordering::Relaxed),
            searches_served: self.searches_served.load(Ordering::Relaxed),
            tool_errors: self.tool_errors.load(Ordering::Relaxed),
            started_at: self.started_at,
            generated_at: Utc::now(),
        }
    }
}

/// The schema document.
pub fn schema_document() -> serde_json::Value {
    json!({
        "node_types": ["Entity", "Episodic", "Community"],
        "relationship_types": ["RELATES_TO", "MENTIONS", "HAS_MEMBER"],
        "properties": {
            "nodes": ["uuid", "name", "summary", "group_id", "created_at"],
            "episodes": ["uuid", "name", "content", "source", "source_description", "valid_at", "created_at"],
            "relationships": ["uuid", "name", "fact", "valid_at", "invalid_at", "created_at", "expired_at"]
        }
    })
}

/// Pretty-printed JSON body of the resource at `uri`, or `None` for unknown URIs.
pub fn read(uri: &str, stats: &ServerStats) -> Option<serde_json::Result<String>> {
    match uri {
        SCHEMA_URI => Some(serde_json::to_string_pretty(&schema_document())),
        STATS_URI => Some(serde_json::to_string_pretty(&stats.snapshot())),
        _ => None,
    }
}
