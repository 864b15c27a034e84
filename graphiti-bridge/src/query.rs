//! Query dispatch: free-text fact search and recipe-driven structured search.

use tracing::debug;

use crate::edges::EntityEdge;
use crate::errors::Result;
use crate::handle::GraphHandle;
use crate::search::{SearchConfig, SearchResults, DEFAULT_SEARCH_LIMIT};

/// Forwards queries to the graph and bounds what comes back.
///
/// Ordering is the graph's. The dispatcher only ever keeps a prefix.
pub struct QueryDispatcher<'a> {
    handle: &'a GraphHandle,
}

impl<'a> QueryDispatcher<'a> {
    pub fn new(handle: &'a GraphHandle) -> Self {
        Self { handle }
    }

    /// Free-text fact search.
    ///
    /// `limit` defaults to [`DEFAULT_SEARCH_LIMIT`] and is passed on as the result-count
    /// hint; anything past it is dropped. A `center_node_uuid` asks the graph to rerank
    /// by distance from that node.
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
        center_node_uuid: Option<&str>,
    ) -> Result<Vec<EntityEdge>> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let driver = self.handle.driver().await?;

        let mut facts = driver.search(query, center_node_uuid, limit).await?;
        facts.truncate(limit);

        debug!(
            query = %query,
            center = center_node_uuid.unwrap_or("-"),
            returned = facts.len(),
            "fact search"
        );
        Ok(facts)
    }

    /// Structured search driven by a recipe such as
    /// [`node_hybrid_search_rrf`](crate::search::node_hybrid_search_rrf).
    pub async fn search_nodes(&self, query: &str, config: &SearchConfig) -> Result<SearchResults> {
        let driver = self.handle.driver().await?;
        let mut results = driver.search_with_config(query, config, None).await?;

        results.nodes.truncate(config.limit);
        results.node_reranker_scores.truncate(config.limit);
        results.edges.truncate(config.limit);
        results.edge_reranker_scores.truncate(config.limit);

        debug!(query = %query, limit = config.limit, nodes = results.nodes.len(), "node search");
        Ok(results)
    }
}
