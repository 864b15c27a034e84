//! The process-wide graph handle.
//!
//! A [`GraphHandle`] owns the configuration and, once first used, the single
//! [`GraphDriver`] every caller shares. The first call to [`GraphHandle::driver`]
//! connects and builds indices; callers racing it wait on that same attempt and
//! receive its outcome, success or failure.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::GraphitiConfig;
use crate::driver::{DriverConnector, GraphDriver};
use crate::errors::{GraphitiError, Result};

/// Remediation printed after an authentication-looking connection failure.
pub const AUTH_FAILURE_HINT: &[&str] = &[
    "Neo4j rejected the configured credentials.",
    "The database may hold a password from an earlier deployment. To reset it:",
    "  Docker:         docker run -e RESET_NEO4J=true ...",
    "  Docker Compose: set RESET_NEO4J=true under the neo4j service environment and restart",
    "  Kubernetes:     set RESET_NEO4J=true in the deployment env and roll the pod",
    "WARNING: RESET_NEO4J=true deletes all existing graph data.",
];

/// Lazily connected, shared access to the graph collaborator.
pub struct GraphHandle {
    config: GraphitiConfig,
    connector: Arc<dyn DriverConnector>,
    driver: OnceCell<InitOutcome>,
}

/// What the single initialization attempt produced.
type InitOutcome = std::result::Result<Arc<dyn GraphDriver>, Arc<GraphitiError>>;

impl GraphHandle {
    /// Create a handle. Nothing connects until [`driver`](Self::driver) is awaited.
    pub fn new(config: GraphitiConfig, connector: Arc<dyn DriverConnector>) -> Self {
        Self {
            config,
            connector,
            driver: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &GraphitiConfig {
        &self.config
    }

    /// Whether a driver has been built.
    pub fn is_initialized(&self) -> bool {
        matches!(self.driver.get(), Some(Ok(_)))
    }

    /// Return the shared driver, connecting and building indices on first use.
    ///
    /// Concurrent first callers share one attempt and its outcome. A failure is
    /// kept: every later call gets the same error and nothing is retried.
    pub async fn driver(&self) -> Result<Arc<dyn GraphDriver>> {
        let outcome = self
            .driver
            .get_or_init(|| async {
                self.initialize().await.map_err(|e| {
                    error!(error = %e, uri = %self.config.neo4j_uri, "graph client initialization failed");
                    if e.is_authentication_failure() {
                        for line in AUTH_FAILURE_HINT {
                            error!("{line}");
                        }
                    }
                    Arc::new(e)
                })
            })
            .await;
        match outcome {
            Ok(driver) => Ok(Arc::clone(driver)),
            Err(e) => Err(GraphitiError::Initialization(Arc::clone(e))),
        }
    }

    async fn initialize(&self) -> Result<Arc<dyn GraphDriver>> {
        info!(uri = %self.config.neo4j_uri, user = %self.config.neo4j_user, "connecting to graph database");
        let driver = self.connector.connect(&self.config).await?;
        driver.build_indices_and_constraints().await?;
        info!("graph client initialized, indices and constraints ready");
        Ok(driver)
    }

    /// Close the driver if one was built. Later calls are no-ops.
    pub async fn close(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(Ok(driver)) => {
                driver.close().await?;
                info!("graph connection closed");
                Ok(())
            }
            Some(Err(_)) | None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DriverCall, RecordingConnector, RecordingDriver};

    fn handle_with(driver: &Arc<RecordingDriver>) -> (GraphHandle, Arc<RecordingConnector>) {
        let connector = Arc::new(RecordingConnector::new(Arc::clone(driver)));
        let handle = GraphHandle::new(GraphitiConfig::default(), connector.clone());
        (handle, connector)
    }

    #[tokio::test]
    async fn test_driver_is_lazy() {
        let driver = Arc::new(RecordingDriver::new());
        let (handle, connector) = handle_with(&driver);
        assert!(!handle.is_initialized());
        assert_eq!(connector.connect_count(), 0);

        handle.driver().await.expect("driver should initialize");
        handle.driver().await.expect("second call reuses the driver");
        assert!(handle.is_initialized());
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(driver.calls(), vec![DriverCall::BuildIndices]);
    }

    #[tokio::test]
    async fn test_close_runs_once() {
        let driver = Arc::new(RecordingDriver::new());
        let (mut handle, _) = handle_with(&driver);
        handle.driver().await.expect("driver should initialize");

        handle.close().await.expect("first close");
        handle.close().await.expect("second close is a no-op");
        assert_eq!(driver.count(|c| matches!(c, DriverCall::Close)), 1);
        assert!(!handle.is_initialized());
    }

    #[tokio::test]
    async fn test_close_before_init_touches_nothing() {
        let driver = Arc::new(RecordingDriver::new());
        let (mut handle, connector) = handle_with(&driver);
        handle.close().await.expect("close without driver");
        assert_eq!(connector.connect_count(), 0);
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_index_setup_leaves_handle_empty() {
        let driver = Arc::new(RecordingDriver::new().failing_indices("index creation refused"));
        let (handle, _) = handle_with(&driver);
        assert!(handle.driver().await.is_err());
        assert!(!handle.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_init_is_not_retried() {
        let driver = Arc::new(RecordingDriver::new().failing_indices("index creation refused"));
        let (handle, connector) = handle_with(&driver);

        let first = handle.driver().await.err().expect("first call fails");
        let second = handle.driver().await.err().expect("later calls see the same failure");
        assert_eq!(first.to_string(), second.to_string());
        assert!(second.to_string().contains("index creation refused"));
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(driver.count(|c| matches!(c, DriverCall::BuildIndices)), 1);
    }
}
