//! Fail-fast startup: configuration first, then one eager graph initialization.

use std::sync::Arc;

use graphiti_bridge::driver::DriverConnector;
use graphiti_bridge::{ConfigMode, GraphHandle, GraphitiConfig, Result};
use tracing::{error, info};

/// Load server-mode configuration through `lookup` and initialize the graph handle.
///
/// Missing variables abort before `connector` is touched. A connection failure is
/// returned as-is; the handle has already logged it, with a remediation hint for
/// rejected credentials.
pub async fn start_graph<F>(lookup: F, connector: Arc<dyn DriverConnector>) -> Result<Arc<GraphHandle>>
where
    F: Fn(&str) -> Option<String>,
{
    let config = GraphitiConfig::from_lookup(ConfigMode::Server, lookup).map_err(|e| {
        error!(missing = ?e.missing_vars(), "configuration error: {e}");
        e
    })?;

    info!(uri = %config.neo4j_uri, user = %config.neo4j_user, "configuration loaded");

    let handle = Arc::new(GraphHandle::new(config, connector));
    handle.driver().await?;
    info!("graph client ready");
    Ok(handle)
}
