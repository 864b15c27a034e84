//! Search configuration and results.
//!
//! Mirrors the recipe style of Graphiti's `search_config_recipes`: a [`SearchConfig`]
//! names which record kinds to retrieve and how to rerank them, and the recipe
//! constructors below are the named presets callers start from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::edges::EntityEdge;
use crate::nodes::EntityNode;

/// Result count used when a caller does not pass one.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// How retrieved facts are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeReranker {
    /// Reciprocal rank fusion of the retrieval methods' rankings.
    Rrf,
    /// Graph distance of each fact's source node from a center node.
    NodeDistance,
}

/// How retrieved entities are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeReranker {
    Rrf,
    NodeDistance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSearchConfig {
    pub reranker: EdgeReranker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSearchConfig {
    pub reranker: NodeReranker,
}

/// Structured search request: which scopes to search and how many records to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub edge_config: Option<EdgeSearchConfig>,
    pub node_config: Option<NodeSearchConfig>,
    pub limit: usize,
    /// Records scoring below this are dropped after reranking.
    pub reranker_min_score: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            edge_config: None,
            node_config: None,
            limit: DEFAULT_SEARCH_LIMIT,
            reranker_min_score: 0.0,
        }
    }
}

impl SearchConfig {
    /// Copy of this recipe with a different result count.
    pub fn with_limit(&self, limit: usize) -> Self {
        Self {
            limit,
            ..self.clone()
        }
    }

    /// Whether any scope reranks by distance and therefore needs a center node.
    pub fn needs_center_node(&self) -> bool {
        matches!(
            self.edge_config,
            Some(EdgeSearchConfig {
                reranker: EdgeReranker::NodeDistance
            })
        ) || matches!(
            self.node_config,
            Some(NodeSearchConfig {
                reranker: NodeReranker::NodeDistance
            })
        )
    }
}

// ── Recipes ──────────────────────────────────────────────────────────────────

/// Facts, hybrid retrieval fused with RRF.
pub fn edge_hybrid_search_rrf() -> SearchConfig {
    SearchConfig {
        edge_config: Some(EdgeSearchConfig {
            reranker: EdgeReranker::Rrf,
        }),
        ..SearchConfig::default()
    }
}

/// Facts, reranked by distance from a center node.
pub fn edge_hybrid_search_node_distance() -> SearchConfig {
    SearchConfig {
        edge_config: Some(EdgeSearchConfig {
            reranker: EdgeReranker::NodeDistance,
        }),
        ..SearchConfig::default()
    }
}

/// Entities, hybrid retrieval fused with RRF.
pub fn node_hybrid_search_rrf() -> SearchConfig {
    SearchConfig {
        node_config: Some(NodeSearchConfig {
            reranker: NodeReranker::Rrf,
        }),
        ..SearchConfig::default()
    }
}

/// Entities, reranked by distance from a center node.
pub fn node_hybrid_search_node_distance() -> SearchConfig {
    SearchConfig {
        node_config: Some(NodeSearchConfig {
            reranker: NodeReranker::NodeDistance,
        }),
        ..SearchConfig::default()
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Output of a structured search. Score vectors run parallel to their record lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub edges: Vec<EntityEdge>,
    pub edge_reranker_scores: Vec<f64>,
    pub nodes: Vec<EntityNode>,
    pub node_reranker_scores: Vec<f64>,
}

// ── Node distance ────────────────────────────────────────────────────────────

/// Stable reorder of `candidates` by graph distance from `center`.
///
/// `candidates` are `(record index, node uuid)` pairs in retrieval order; `neighbours`
/// holds the uuids directly connected to the center. The center itself ranks first,
/// neighbours next, everything else keeps its retrieval order at the end. Returns
/// `(record index, score)` with score `1 / distance` (the center scores 10).
pub fn rank_by_node_distance(
    candidates: &[(usize, Option<&str>)],
    center: &str,
    neighbours: &HashSet<String>,
) -> Vec<(usize, f64)> {
    let distance = |uuid: Option<&str>| match uuid {
        Some(u) if u == center => 0.1,
        Some(u) if neighbours.contains(u) => 1.0,
        _ => f64::INFINITY,
    };

    let mut ranked: Vec<(usize, f64)> = candidates
        .iter()
        .map(|(idx, uuid)| (*idx, distance(*uuid)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    ranked
        .into_iter()
        .map(|(idx, dist)| (idx, 1.0 / dist))
        .collect()
}
