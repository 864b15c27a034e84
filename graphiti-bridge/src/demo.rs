//! The quickstart walkthrough: ingest a few podcast episodes, search, rerank, and
//! list matching entities.

use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

use crate::edges::EntityEdge;
use crate::errors::Result;
use crate::format::{fact_lines, node_lines};
use crate::handle::GraphHandle;
use crate::ingest::EpisodeIngester;
use crate::nodes::{EntityNode, Episode};
use crate::query::QueryDispatcher;
use crate::search::node_hybrid_search_rrf;

pub const DEMO_QUERY: &str = "Who was the California Attorney General?";
pub const NODE_QUERY: &str = "California Governor";
pub const NODE_SEARCH_LIMIT: usize = 5;

/// What the walkthrough found.
#[derive(Debug, Clone, Default)]
pub struct DemoReport {
    pub episodes_added: usize,
    pub facts: Vec<EntityEdge>,
    /// Center node used for the rerank, when the first search found anything.
    pub center_node_uuid: Option<String>,
    pub reranked_facts: Vec<EntityEdge>,
    pub nodes: Vec<EntityNode>,
}

/// The four fixture episodes, named `Freakonomics Radio 0..3`, stamped now.
pub fn demo_episodes() -> Result<Vec<Episode>> {
    let now = Utc::now();
    let transcript = "podcast transcript";
    let metadata = "podcast metadata";

    let episodes = vec![
        Episode::text(
            "Freakonomics Radio 0",
            "Kamala Harris is the Attorney General of California. She was previously \
             the district attorney for San Francisco.",
        )
        .with_source_description(transcript),
        Episode::text(
            "Freakonomics Radio 1",
            "As AG, Harris was in office from January 3, 2011 – January 3, 2017",
        )
        .with_source_description(transcript),
        Episode::json(
            "Freakonomics Radio 2",
            &json!({
                "name": "Gavin Newsom",
                "position": "Governor",
                "state": "California",
                "previous_role": "Lieutenant Governor",
                "previous_location": "San Francisco",
            }),
        )?
        .with_source_description(metadata),
        Episode::json(
            "Freakonomics Radio 3",
            &json!({
                "name": "Gavin Newsom",
                "position": "Governor",
                "term_start": "January 7, 2019",
                "term_end": "Present",
            }),
        )?
        .with_source_description(metadata),
    ];

    Ok(episodes
        .into_iter()
        .map(|e| e.with_reference_time(now))
        .collect())
}

/// Run the walkthrough against `handle`, leaving it open.
pub async fn run_quickstart(handle: &GraphHandle) -> Result<DemoReport> {
    let mut report = DemoReport::default();

    info!("building indices and constraints");
    handle.driver().await?;

    info!("adding episodes to the knowledge graph");
    let ingester = EpisodeIngester::new(handle);
    for episode in demo_episodes()? {
        let (name, kind) = (episode.name.clone(), episode.kind);
        ingester.add_episode(episode).await?;
        info!("added episode: {name} ({kind})");
        report.episodes_added += 1;
    }

    let dispatcher = QueryDispatcher::new(handle);

    info!("running hybrid search: '{DEMO_QUERY}'");
    report.facts = dispatcher.search(DEMO_QUERY, None, None).await?;
    info!("search results:");
    log_lines(&fact_lines(&report.facts));

    match report.facts.first().and_then(|f| f.source_node_uuid.clone()) {
        Some(center) => {
            info!("reranking search results by graph distance");
            info!("using center node UUID: {center}");
            report.reranked_facts = dispatcher.search(DEMO_QUERY, None, Some(&center)).await?;
            info!("reranked search results:");
            log_lines(&fact_lines(&report.reranked_facts));
            report.center_node_uuid = Some(center);
        }
        None => info!("no results in the initial search to use as a center node"),
    }

    info!("running node search with the node_hybrid_search_rrf recipe: '{NODE_QUERY}'");
    let config = node_hybrid_search_rrf().with_limit(NODE_SEARCH_LIMIT);
    report.nodes = dispatcher.search_nodes(NODE_QUERY, &config).await?.nodes;
    info!("node search results:");
    log_lines(&node_lines(&report.nodes));

    info!("quickstart complete");
    Ok(report)
}

/// Run the walkthrough, then close the handle whether or not it succeeded.
///
/// A walkthrough error wins over a close error; both are logged.
pub async fn run_and_close(handle: &mut GraphHandle) -> Result<DemoReport> {
    let outcome = run_quickstart(handle).await;
    if let Err(e) = &outcome {
        error!("quickstart failed: {e}");
    }

    let closed = handle.close().await;
    if let Err(e) = &closed {
        error!("closing the graph connection failed: {e}");
    }

    let report = outcome?;
    closed?;
    Ok(report)
}

fn log_lines(lines: &[String]) {
    for line in lines {
        info!("{line}");
    }
}
