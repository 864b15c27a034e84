#![allow(dead_code)]

use std::sync::Arc;

use graphiti_bridge::edges::EntityEdge;
use graphiti_bridge::testing::{RecordingConnector, RecordingDriver};
use graphiti_bridge::{GraphHandle, GraphitiConfig};
use graphiti_mcp_server::resources::ServerStats;
use graphiti_mcp_server::tools::ToolArguments;
use graphiti_mcp_server::GraphitiMcpServer;
use serde_json::Value;

/// A server wired to a recording collaborator.
pub struct TestServer {
    pub driver: Arc<RecordingDriver>,
    pub connector: Arc<RecordingConnector>,
    pub server: GraphitiMcpServer,
}

impl TestServer {
    pub fn new() -> Self {
        Self::over(RecordingDriver::new())
    }

    pub fn with_facts(facts: Vec<EntityEdge>) -> Self {
        Self::over(RecordingDriver::new().with_facts(facts))
    }

    pub fn over(driver: RecordingDriver) -> Self {
        let driver = Arc::new(driver);
        let connector = Arc::new(RecordingConnector::new(driver.clone()));
        let handle = Arc::new(GraphHandle::new(GraphitiConfig::default(), connector.clone()));
        let server = GraphitiMcpServer::new(handle, Arc::new(ServerStats::new()));
        Self {
            driver,
            connector,
            server,
        }
    }
}

/// Turn a `json!` object literal into tool arguments.
pub fn args(value: Value) -> Option<ToolArguments> {
    match value {
        Value::Object(map) => Some(map),
        _ => panic!("tool arguments must be a JSON object"),
    }
}

/// Lookup over a fixed set of variables.
pub fn lookup(vars: Vec<(&'static str, &'static str)>) -> impl Fn(&str) -> Option<String> {
    move |name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    }
}
