//! Rendering of search records for logs and tool responses.

use chrono::{DateTime, Utc};

use crate::edges::EntityEdge;
use crate::nodes::EntityNode;
use crate::utils::truncate_with_ellipsis;

/// Node summaries longer than this are cut in log output.
pub const SUMMARY_PREVIEW_CHARS: usize = 100;

/// Separator logged after each record.
pub const RECORD_SEPARATOR: &str = "---";

/// Logged for a fact whose valid-time window does not cover the current time.
pub const NOT_CURRENT_MARKER: &str = "Status: not currently valid";

/// Log lines for a list of facts, one block per record.
pub fn fact_lines(facts: &[EntityEdge]) -> Vec<String> {
    fact_lines_at(facts, Utc::now())
}

/// Like [`fact_lines`], judging each fact's window against `now`.
pub fn fact_lines_at(facts: &[EntityEdge], now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::with_capacity(facts.len() * 6);
    for fact in facts {
        lines.push(format!("UUID: {}", fact.uuid));
        lines.push(format!("Fact: {}", fact.fact));
        if let Some(valid_at) = fact.valid_at {
            lines.push(format!("Valid from: {}", valid_at.to_rfc3339()));
        }
        if let Some(invalid_at) = fact.invalid_at {
            lines.push(format!("Valid until: {}", invalid_at.to_rfc3339()));
        }
        if !fact.is_valid_at(now) {
            lines.push(NOT_CURRENT_MARKER.to_string());
        }
        lines.push(RECORD_SEPARATOR.to_string());
    }
    lines
}

/// Log lines for a list of entity nodes.
pub fn node_lines(nodes: &[EntityNode]) -> Vec<String> {
    let mut lines = Vec::new();
    for node in nodes {
        lines.push(format!("Node UUID: {}", node.uuid));
        lines.push(format!("Node Name: {}", node.name));
        lines.push(format!(
            "Content Summary: {}",
            truncate_with_ellipsis(&node.summary, SUMMARY_PREVIEW_CHARS)
        ));
        lines.push(format!("Node Labels: {}", node.labels.join(", ")));
        lines.push(format!("Created At: {}", node.created_at.to_rfc3339()));
        if !node.attributes.is_empty() {
            lines.push("Attributes:".to_string());
            for (key, value) in &node.attributes {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(format!("  {key}: {value}"));
            }
        }
        lines.push(RECORD_SEPARATOR.to_string());
    }
    lines
}

// ── Tool responses ────────────────────────────────────────────────────────────

/// Response text for `search_graph`.
pub fn search_response(query: &str, facts: &[EntityEdge]) -> String {
    if facts.is_empty() {
        return format!("No results found for '{query}'");
    }

    let mut lines = vec![format!("Search results for '{query}':")];
    for (i, fact) in facts.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("{}. **Fact**: {}", i + 1, fact.fact));
        if !fact.uuid.is_empty() {
            lines.push(format!("   **UUID**: {}", fact.uuid));
        }
        if let Some(valid_at) = fact.valid_at {
            lines.push(format!("   **Valid from**: {}", valid_at.to_rfc3339()));
        }
    }
    lines.join("\n")
}

/// Response text for `get_entities`.
pub fn entity_response(facts: &[EntityEdge]) -> String {
    numbered_facts("Entities:", "No entities found in the knowledge graph", facts)
}

/// Response text for `get_communities`.
pub fn community_response(facts: &[EntityEdge]) -> String {
    numbered_facts("Communities:", "No communities found in the knowledge graph", facts)
}

fn numbered_facts(header: &str, empty: &str, facts: &[EntityEdge]) -> String {
    if facts.is_empty() {
        return empty.to_string();
    }
    let mut out = header.to_string();
    for (i, fact) in facts.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, fact.fact));
    }
    out
}
