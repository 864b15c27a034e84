//! Quickstart demo: ingest the podcast fixtures into Neo4j and run the sample searches.
//!
//! Reads `NEO4J_URI`, `NEO4J_USER` and `NEO4J_PASSWORD` (with local defaults) from the
//! environment or a `.env` file.

use std::sync::Arc;

use graphiti_bridge::demo::run_and_close;
use graphiti_bridge::driver::neo4j::Neo4jConnector;
use graphiti_bridge::{ConfigMode, GraphHandle, GraphitiConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("graphiti_bridge=info".parse()?)
                .add_directive("quickstart=info".parse()?),
        )
        .with_target(false)
        .init();

    info!("starting graphiti quickstart");

    let config = GraphitiConfig::from_env(ConfigMode::Demo).map_err(|e| {
        error!("configuration error: {e}");
        e
    })?;

    let mut handle = GraphHandle::new(config, Arc::new(Neo4jConnector));
    let report = run_and_close(&mut handle).await?;
    info!("connection closed");

    info!(
        episodes = report.episodes_added,
        facts = report.facts.len(),
        nodes = report.nodes.len(),
        "done"
    );
    Ok(())
}
