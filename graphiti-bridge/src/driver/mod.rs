//! Graph collaborator abstraction.
//!
//! [`GraphDriver`] is the whole contract this crate needs from the knowledge-graph
//! service: schema setup, episode ingestion, free-text fact search and structured
//! search. [`DriverConnector`] builds a driver from configuration so the lazy
//! handle can be pointed at Neo4j in production and at a recording fake in tests.

pub mod neo4j;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::GraphitiConfig;
use crate::edges::EntityEdge;
use crate::errors::Result;
use crate::nodes::Episode;
use crate::search::{SearchConfig, SearchResults};

/// Trait representing the knowledge-graph collaborator.
#[async_trait]
pub trait GraphDriver: Send + Sync {
    /// Create indices and constraints. Idempotent; run once per process by the handle.
    async fn build_indices_and_constraints(&self) -> Result<()>;

    /// Hand an episode to the graph.
    async fn add_episode(&self, episode: &Episode) -> Result<()>;

    /// Free-text fact search, best match first.
    ///
    /// With `center_node_uuid`, results are reranked by graph distance from that node.
    async fn search(
        &self,
        query: &str,
        center_node_uuid: Option<&str>,
        num_results: usize,
    ) -> Result<Vec<EntityEdge>>;

    /// Recipe-driven search returning records plus reranker scores.
    async fn search_with_config(
        &self,
        query: &str,
        config: &SearchConfig,
        center_node_uuid: Option<&str>,
    ) -> Result<SearchResults>;

    /// Release connections.
    async fn close(&self) -> Result<()>;
}

/// Builds a [`GraphDriver`] from configuration.
#[async_trait]
pub trait DriverConnector: Send + Sync {
    async fn connect(&self, config: &GraphitiConfig) -> Result<Arc<dyn GraphDriver>>;
}
