//! Neo4j graph driver implementation.
//!
//! Uses `neo4rs` 0.8 for async, pooled Bolt connections and speaks the Graphiti
//! schema: `Episodic` and `Entity` nodes, `RELATES_TO` facts, and the full-text
//! indices the Graphiti service queries. Extraction of entities and facts from
//! episodes is the graph service's job; this driver stores episodes and reads
//! what the service has derived.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neo4rs::{query, Graph, Query, Row};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::GraphitiConfig;
use crate::edges::EntityEdge;
use crate::errors::{GraphitiError, Result};
use crate::nodes::{EntityNode, Episode};
use crate::search::{
    edge_hybrid_search_node_distance, edge_hybrid_search_rrf, rank_by_node_distance,
    EdgeReranker, NodeReranker, SearchConfig, SearchResults,
};
use crate::utils::{format_neo4j_datetime, fulltext_query, parse_neo4j_datetime};

use super::{DriverConnector, GraphDriver};

/// Range and full-text indices of the Graphiti schema. All `IF NOT EXISTS`.
pub const INDEX_STATEMENTS: &[&str] = &[
    "CREATE INDEX entity_uuid IF NOT EXISTS FOR (n:Entity) ON (n.uuid)",
    "CREATE INDEX episode_uuid IF NOT EXISTS FOR (n:Episodic) ON (n.uuid)",
    "CREATE INDEX community_uuid IF NOT EXISTS FOR (n:Community) ON (n.uuid)",
    "CREATE INDEX relation_uuid IF NOT EXISTS FOR ()-[e:RELATES_TO]-() ON (e.uuid)",
    "CREATE INDEX mention_uuid IF NOT EXISTS FOR ()-[e:MENTIONS]-() ON (e.uuid)",
    "CREATE INDEX has_member_uuid IF NOT EXISTS FOR ()-[e:HAS_MEMBER]-() ON (e.uuid)",
    "CREATE INDEX entity_group_id IF NOT EXISTS FOR (n:Entity) ON (n.group_id)",
    "CREATE INDEX episode_group_id IF NOT EXISTS FOR (n:Episodic) ON (n.group_id)",
    "CREATE INDEX relation_group_id IF NOT EXISTS FOR ()-[e:RELATES_TO]-() ON (e.group_id)",
    "CREATE INDEX name_entity_index IF NOT EXISTS FOR (n:Entity) ON (n.name)",
    "CREATE INDEX created_at_entity_index IF NOT EXISTS FOR (n:Entity) ON (n.created_at)",
    "CREATE INDEX valid_at_episodic_index IF NOT EXISTS FOR (n:Episodic) ON (n.valid_at)",
    "CREATE INDEX name_edge_index IF NOT EXISTS FOR ()-[e:RELATES_TO]-() ON (e.name)",
    "CREATE INDEX valid_at_edge_index IF NOT EXISTS FOR ()-[e:RELATES_TO]-() ON (e.valid_at)",
    "CREATE INDEX invalid_at_edge_index IF NOT EXISTS FOR ()-[e:RELATES_TO]-() ON (e.invalid_at)",
    "CREATE FULLTEXT INDEX episode_content IF NOT EXISTS \
     FOR (e:Episodic) ON EACH [e.content, e.source, e.source_description, e.group_id]",
    "CREATE FULLTEXT INDEX node_name_and_summary IF NOT EXISTS \
     FOR (n:Entity) ON EACH [n.name, n.summary, n.group_id]",
    "CREATE FULLTEXT INDEX community_name IF NOT EXISTS \
     FOR (n:Community) ON EACH [n.name, n.group_id]",
    "CREATE FULLTEXT INDEX edge_name_and_fact IF NOT EXISTS \
     FOR ()-[e:RELATES_TO]-() ON EACH [e.name, e.fact, e.group_id]",
];

/// Node properties reported as first-class fields rather than attributes.
const CORE_NODE_PROPERTIES: &[&str] = &[
    "uuid",
    "name",
    "summary",
    "group_id",
    "created_at",
    "name_embedding",
    "labels",
];

const ADD_EPISODE: &str = "\
MERGE (n:Episodic {uuid: $uuid})
SET n.name = $name,
    n.group_id = $group_id,
    n.source = $source,
    n.source_description = $source_description,
    n.content = $content,
    n.entity_edges = [],
    n.created_at = datetime($created_at),
    n.valid_at = datetime($valid_at)";

const EDGE_FULLTEXT: &str = "\
CALL db.index.fulltext.queryRelationships('edge_name_and_fact', $query, {limit: $limit})
YIELD relationship AS rel, score
MATCH (n:Entity)-[e:RELATES_TO {uuid: rel.uuid}]->(m:Entity)
RETURN e.uuid AS uuid,
       e.name AS name,
       e.fact AS fact,
       n.uuid AS source_node_uuid,
       m.uuid AS target_node_uuid,
       toString(e.valid_at) AS valid_at,
       toString(e.invalid_at) AS invalid_at,
       toString(e.created_at) AS created_at,
       toString(e.expired_at) AS expired_at,
       e.group_id AS group_id,
       score
ORDER BY score DESC
LIMIT $limit";

const NODE_FULLTEXT: &str = "\
CALL db.index.fulltext.queryNodes('node_name_and_summary', $query, {limit: $limit})
YIELD node AS n, score
WHERE n:Entity
RETURN n.uuid AS uuid,
       n.name AS name,
       coalesce(n.summary, '') AS summary,
       labels(n) AS labels,
       toString(n.created_at) AS created_at,
       n.group_id AS group_id,
       [k IN keys(n) WHERE NOT k IN $core AND toStringOrNull(n[k]) IS NOT NULL
          | {key: k, value: toStringOrNull(n[k])}] AS attributes,
       score
ORDER BY score DESC
LIMIT $limit";

const CENTER_NEIGHBOURS: &str = "\
MATCH (center:Entity {uuid: $center_uuid})-[:RELATES_TO]-(n:Entity)
WHERE n.uuid IN $node_uuids
RETURN DISTINCT n.uuid AS uuid";

#[derive(Debug, Deserialize)]
struct AttributePair {
    key: String,
    value: String,
}

/// Graph driver backed by a Neo4j database holding the Graphiti schema.
pub struct Neo4jDriver {
    graph: Graph,
    group_id: String,
}

impl Neo4jDriver {
    /// Open a connection pool using the configured URI and credentials.
    pub async fn connect(config: &GraphitiConfig) -> Result<Self> {
        let graph = Graph::new(
            config.neo4j_uri.as_str(),
            config.neo4j_user.as_str(),
            config.neo4j_password.as_str(),
        )
        .await?;

        Ok(Self {
            graph,
            group_id: config.group_id.clone(),
        })
    }

    async fn fetch_rows(&self, q: Query) -> Result<Vec<Row>> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn edge_fulltext(&self, text: &str, limit: usize) -> Result<(Vec<EntityEdge>, Vec<f64>)> {
        let rows = self
            .fetch_rows(
                query(EDGE_FULLTEXT)
                    .param("query", text)
                    .param("limit", limit as i64),
            )
            .await?;

        let mut edges = Vec::with_capacity(rows.len());
        let mut scores = Vec::with_capacity(rows.len());
        for row in &rows {
            edges.push(edge_from_row(row)?);
            scores.push(row.get::<f64>("score")?);
        }
        Ok((edges, scores))
    }

    async fn node_fulltext(&self, text: &str, limit: usize) -> Result<(Vec<EntityNode>, Vec<f64>)> {
        let core: Vec<String> = CORE_NODE_PROPERTIES.iter().map(|p| p.to_string()).collect();
        let rows = self
            .fetch_rows(
                query(NODE_FULLTEXT)
                    .param("query", text)
                    .param("limit", limit as i64)
                    .param("core", core),
            )
            .await?;

        let mut nodes = Vec::with_capacity(rows.len());
        let mut scores = Vec::with_capacity(rows.len());
        for row in &rows {
            nodes.push(node_from_row(row)?);
            scores.push(row.get::<f64>("score")?);
        }
        Ok((nodes, scores))
    }

    /// Order `keys` (one node uuid per record) by distance from `center`.
    async fn distance_order(&self, keys: &[Option<&str>], center: &str) -> Result<Vec<(usize, f64)>> {
        let node_uuids: Vec<String> = keys.iter().flatten().map(|u| u.to_string()).collect();
        let rows = self
            .fetch_rows(
                query(CENTER_NEIGHBOURS)
                    .param("center_uuid", center)
                    .param("node_uuids", node_uuids),
            )
            .await?;

        let mut neighbours = HashSet::with_capacity(rows.len());
        for row in &rows {
            neighbours.insert(row.get::<String>("uuid")?);
        }

        let candidates: Vec<(usize, Option<&str>)> = keys.iter().copied().enumerate().collect();
        Ok(rank_by_node_distance(&candidates, center, &neighbours))
    }
}

#[async_trait]
impl GraphDriver for Neo4jDriver {
    async fn build_indices_and_constraints(&self) -> Result<()> {
        for statement in INDEX_STATEMENTS {
            self.graph.run(query(statement)).await?;
        }
        debug!(count = INDEX_STATEMENTS.len(), "indices and constraints in place");
        Ok(())
    }

    async fn add_episode(&self, episode: &Episode) -> Result<()> {
        let uuid = Uuid::new_v4().to_string();
        let group_id = episode
            .group_id
            .clone()
            .unwrap_or_else(|| self.group_id.clone());

        let q = query(ADD_EPISODE)
            .param("uuid", uuid.as_str())
            .param("name", episode.name.as_str())
            .param("group_id", group_id)
            .param("source", episode.kind.as_str())
            .param("source_description", episode.source_description.as_str())
            .param("content", episode.body.as_str())
            .param("created_at", format_neo4j_datetime(&Utc::now()))
            .param("valid_at", format_neo4j_datetime(&episode.reference_time));

        self.graph.run(q).await?;
        debug!(uuid = %uuid, name = %episode.name, "episode stored");
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        center_node_uuid: Option<&str>,
        num_results: usize,
    ) -> Result<Vec<EntityEdge>> {
        let recipe = match center_node_uuid {
            Some(_) => edge_hybrid_search_node_distance(),
            None => edge_hybrid_search_rrf(),
        };
        let results = self
            .search_with_config(query, &recipe.with_limit(num_results), center_node_uuid)
            .await?;
        Ok(results.edges)
    }

    async fn search_with_config(
        &self,
        query: &str,
        config: &SearchConfig,
        center_node_uuid: Option<&str>,
    ) -> Result<SearchResults> {
        if config.needs_center_node() && center_node_uuid.is_none() {
            return Err(GraphitiError::Search(
                "node distance reranking requires a center node uuid".to_string(),
            ));
        }

        let mut results = SearchResults::default();
        let text = fulltext_query(query);
        if text.is_empty() {
            return Ok(results);
        }

        if let Some(edge_config) = &config.edge_config {
            let (edges, scores) = self.edge_fulltext(&text, config.limit).await?;
            let (edges, scores) = match (edge_config.reranker, center_node_uuid) {
                (EdgeReranker::NodeDistance, Some(center)) => {
                    let order = {
                        let keys: Vec<Option<&str>> =
                            edges.iter().map(|e| e.source_node_uuid.as_deref()).collect();
                        self.distance_order(&keys, center).await?
                    };
                    reorder(edges, &order)
                }
                _ => (edges, scores),
            };
            (results.edges, results.edge_reranker_scores) =
                keep_scored(edges, scores, config.reranker_min_score, config.limit);
        }

        if let Some(node_config) = &config.node_config {
            let (nodes, scores) = self.node_fulltext(&text, config.limit).await?;
            let (nodes, scores) = match (node_config.reranker, center_node_uuid) {
                (NodeReranker::NodeDistance, Some(center)) => {
                    let order = {
                        let keys: Vec<Option<&str>> =
                            nodes.iter().map(|n| Some(n.uuid.as_str())).collect();
                        self.distance_order(&keys, center).await?
                    };
                    reorder(nodes, &order)
                }
                _ => (nodes, scores),
            };
            (results.nodes, results.node_reranker_scores) =
                keep_scored(nodes, scores, config.reranker_min_score, config.limit);
        }

        debug!(
            edges = results.edges.len(),
            nodes = results.nodes.len(),
            "structured search complete"
        );
        Ok(results)
    }

    /// The pool is released when the driver is dropped; nothing is held open past that.
    async fn close(&self) -> Result<()> {
        debug!("releasing Neo4j connection pool");
        Ok(())
    }
}

/// Connector producing [`Neo4jDriver`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neo4jConnector;

#[async_trait]
impl DriverConnector for Neo4jConnector {
    async fn connect(&self, config: &GraphitiConfig) -> Result<Arc<dyn GraphDriver>> {
        let driver = Neo4jDriver::connect(config).await?;
        Ok(Arc::new(driver))
    }
}

// ── Row decoding ──────────────────────────────────────────────────────────────

fn optional_datetime(row: &Row, key: &str) -> Result<Option<DateTime<Utc>>> {
    match row.get::<Option<String>>(key)? {
        None => Ok(None),
        Some(raw) => parse_neo4j_datetime(&raw)
            .map(Some)
            .ok_or_else(|| GraphitiError::Driver(format!("unparseable {key}: {raw}"))),
    }
}

fn edge_from_row(row: &Row) -> Result<EntityEdge> {
    Ok(EntityEdge {
        uuid: row.get("uuid")?,
        name: row.get::<Option<String>>("name")?.unwrap_or_default(),
        fact: row.get("fact")?,
        source_node_uuid: row.get("source_node_uuid")?,
        target_node_uuid: row.get("target_node_uuid")?,
        valid_at: optional_datetime(row, "valid_at")?,
        invalid_at: optional_datetime(row, "invalid_at")?,
        created_at: optional_datetime(row, "created_at")?,
        expired_at: optional_datetime(row, "expired_at")?,
        group_id: row.get("group_id")?,
    })
}

fn node_from_row(row: &Row) -> Result<EntityNode> {
    let uuid: String = row.get("uuid")?;
    let created_at = optional_datetime(row, "created_at")?
        .ok_or_else(|| GraphitiError::Driver(format!("entity {uuid} has no created_at")))?;

    let attributes = row
        .get::<Vec<AttributePair>>("attributes")?
        .into_iter()
        .map(|pair| (pair.key, serde_json::Value::String(pair.value)))
        .collect();

    Ok(EntityNode {
        uuid,
        name: row.get("name")?,
        summary: row.get("summary")?,
        labels: row.get("labels")?,
        created_at,
        group_id: row.get("group_id")?,
        attributes,
    })
}

// ── Result shaping ────────────────────────────────────────────────────────────

/// Rearrange `items` into `order`, pairing each with its new score.
fn reorder<T>(items: Vec<T>, order: &[(usize, f64)]) -> (Vec<T>, Vec<f64>) {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|(idx, score)| {
            slots
                .get_mut(*idx)
                .and_then(Option::take)
                .map(|item| (item, *score))
        })
        .unzip()
}

/// Drop records under `min_score` and cap at `limit`, keeping order.
fn keep_scored<T>(items: Vec<T>, scores: Vec<f64>, min_score: f64, limit: usize) -> (Vec<T>, Vec<f64>) {
    items
        .into_iter()
        .zip(scores)
        .filter(|(_, score)| *score >= min_score)
        .take(limit)
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_statements_are_idempotent() {
        assert!(INDEX_STATEMENTS.iter().all(|s| s.contains("IF NOT EXISTS")));
    }

    #[test]
    fn fulltext_indices_match_search_queries() {
        for index in ["edge_name_and_fact", "node_name_and_summary"] {
            assert!(
                INDEX_STATEMENTS
                    .iter()
                    .any(|s| s.contains("FULLTEXT") && s.contains(index)),
                "missing full-text index {index}"
            );
        }
        assert!(EDGE_FULLTEXT.contains("edge_name_and_fact"));
        assert!(NODE_FULLTEXT.contains("node_name_and_summary"));
    }

    #[test]
    fn reorder_follows_ranking() {
        let (items, scores) = reorder(vec!["a", "b", "c"], &[(2, 10.0), (0, 1.0), (1, 0.0)]);
        assert_eq!(items, vec!["c", "a", "b"]);
        assert_eq!(scores, vec![10.0, 1.0, 0.0]);
    }

    #[test]
    fn reorder_ignores_unknown_indices() {
        let (items, _) = reorder(vec!["a"], &[(5, 1.0), (0, 0.5)]);
        assert_eq!(items, vec!["a"]);
    }

    #[test]
    fn keep_scored_filters_then_caps() {
        let (items, scores) = keep_scored(vec![1, 2, 3, 4], vec![0.9, 0.1, 0.8, 0.7], 0.5, 2);
        assert_eq!(items, vec![1, 3]);
        assert_eq!(scores, vec![0.9, 0.8]);
    }
}
