//! Scripted graph collaborator for tests.
//!
//! [`RecordingDriver`] answers every [`GraphDriver`] call from fixed data and records
//! the call; [`RecordingConnector`] hands it out and counts connections. Enabled in
//! this crate's tests and, for dependents, through the `test-util` feature.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::config::GraphitiConfig;
use crate::driver::{DriverConnector, GraphDriver};
use crate::edges::EntityEdge;
use crate::errors::{GraphitiError, Result};
use crate::nodes::{EntityNode, Episode};
use crate::search::{SearchConfig, SearchResults};

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    BuildIndices,
    AddEpisode(Episode),
    Search {
        query: String,
        center_node_uuid: Option<String>,
        num_results: usize,
    },
    SearchWithConfig {
        query: String,
        config: SearchConfig,
        center_node_uuid: Option<String>,
    },
    Close,
}

/// In-memory collaborator. Searches return every scripted record regardless of the
/// requested count, so callers' own bounding is what tests observe.
#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<DriverCall>>,
    facts: Vec<EntityEdge>,
    nodes: Vec<EntityNode>,
    indices_error: Option<String>,
    add_error: Option<String>,
    search_error: Option<String>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_facts(mut self, facts: Vec<EntityEdge>) -> Self {
        self.facts = facts;
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<EntityNode>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Fail index setup with a driver error carrying `message`.
    pub fn failing_indices(mut self, message: &str) -> Self {
        self.indices_error = Some(message.to_string());
        self
    }

    pub fn failing_add(mut self, message: &str) -> Self {
        self.add_error = Some(message.to_string());
        self
    }

    pub fn failing_search(mut self, message: &str) -> Self {
        self.search_error = Some(message.to_string());
        self
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.lock().iter().filter(|c| pred(c)).count()
    }

    /// Episodes received by `add_episode`, in order.
    pub fn added_episodes(&self) -> Vec<Episode> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                DriverCall::AddEpisode(episode) => Some(episode.clone()),
                _ => None,
            })
            .collect()
    }

    /// Queries received by `search`, in order.
    pub fn search_queries(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                DriverCall::Search { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DriverCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: DriverCall) {
        self.lock().push(call);
    }

    fn fail_with(message: &Option<String>) -> Result<()> {
        match message {
            Some(m) => Err(GraphitiError::Driver(m.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GraphDriver for RecordingDriver {
    async fn build_indices_and_constraints(&self) -> Result<()> {
        self.record(DriverCall::BuildIndices);
        Self::fail_with(&self.indices_error)
    }

    async fn add_episode(&self, episode: &Episode) -> Result<()> {
        self.record(DriverCall::AddEpisode(episode.clone()));
        Self::fail_with(&self.add_error)
    }

    async fn search(
        &self,
        query: &str,
        center_node_uuid: Option<&str>,
        num_results: usize,
    ) -> Result<Vec<EntityEdge>> {
        self.record(DriverCall::Search {
            query: query.to_string(),
            center_node_uuid: center_node_uuid.map(str::to_string),
            num_results,
        });
        Self::fail_with(&self.search_error)?;
        Ok(self.facts.clone())
    }

    async fn search_with_config(
        &self,
        query: &str,
        config: &SearchConfig,
        center_node_uuid: Option<&str>,
    ) -> Result<SearchResults> {
        self.record(DriverCall::SearchWithConfig {
            query: query.to_string(),
            config: config.clone(),
            center_node_uuid: center_node_uuid.map(str::to_string),
        });
        Self::fail_with(&self.search_error)?;

        let mut results = SearchResults::default();
        if config.edge_config.is_some() {
            results.edges = self.facts.clone();
            results.edge_reranker_scores = descending_scores(self.facts.len());
        }
        if config.node_config.is_some() {
            results.nodes = self.nodes.clone();
            results.node_reranker_scores = descending_scores(self.nodes.len());
        }
        Ok(results)
    }

    async fn close(&self) -> Result<()> {
        self.record(DriverCall::Close);
        Ok(())
    }
}

fn descending_scores(n: usize) -> Vec<f64> {
    (0..n).map(|i| 1.0 / (i as f64 + 1.0)).collect()
}

/// Hands out one shared [`RecordingDriver`] and counts how often it was asked to.
pub struct RecordingConnector {
    driver: Arc<RecordingDriver>,
    connects: AtomicUsize,
    error: Option<String>,
}

impl RecordingConnector {
    pub fn new(driver: Arc<RecordingDriver>) -> Self {
        Self {
            driver,
            connects: AtomicUsize::new(0),
            error: None,
        }
    }

    /// Fail every connection attempt with a driver error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverConnector for RecordingConnector {
    async fn connect(&self, _config: &GraphitiConfig) -> Result<Arc<dyn GraphDriver>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        // Give racing callers a chance to interleave with an in-flight connect.
        tokio::task::yield_now().await;

        if let Some(message) = &self.error {
            return Err(GraphitiError::Driver(message.clone()));
        }
        let driver: Arc<dyn GraphDriver> = self.driver.clone();
        Ok(driver)
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// `n` facts with uuids `fact-0..`, each sourced from node `node-<i>`.
pub fn sample_facts(n: usize) -> Vec<EntityEdge> {
    (0..n)
        .map(|i| {
            let mut edge = EntityEdge::new(format!("fact-{i}"), format!("Fact number {i}"));
            edge.source_node_uuid = Some(format!("node-{i}"));
            edge
        })
        .collect()
}

/// `n` entity nodes with uuids `node-0..`.
pub fn sample_nodes(n: usize) -> Vec<EntityNode> {
    (0..n)
        .map(|i| EntityNode {
            uuid: format!("node-{i}"),
            name: format!("Entity {i}"),
            summary: format!("Summary of entity {i}"),
            labels: vec!["Entity".to_string()],
            created_at: Utc.timestamp_opt(1_700_000_000 + i as i64, 0).single().unwrap_or_default(),
            group_id: None,
            attributes: BTreeMap::new(),
        })
        .collect()
}
