//! Episode ingestion.

use tracing::info;

use crate::errors::Result;
use crate::handle::GraphHandle;
use crate::nodes::Episode;

/// Pushes episodes through the shared handle.
pub struct EpisodeIngester<'a> {
    handle: &'a GraphHandle,
}

impl<'a> EpisodeIngester<'a> {
    pub fn new(handle: &'a GraphHandle) -> Self {
        Self { handle }
    }

    /// Validate `episode` and hand it to the graph.
    ///
    /// Validation runs before the driver is touched, so a malformed JSON body never
    /// triggers a connection. Episodes without a group take the configured one.
    pub async fn add_episode(&self, mut episode: Episode) -> Result<()> {
        episode.validate()?;

        let group_id = &self.handle.config().group_id;
        if episode.group_id.is_none() && !group_id.is_empty() {
            episode.group_id = Some(group_id.clone());
        }

        let driver = self.handle.driver().await?;
        driver.add_episode(&episode).await?;

        info!(
            name = %episode.name,
            kind = %episode.kind,
            source = %episode.source_description,
            "episode added"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::GraphitiConfig;
    use crate::errors::GraphitiError;
    use crate::nodes::EpisodeType;
    use crate::testing::{DriverCall, RecordingConnector, RecordingDriver};

    fn handle(driver: &Arc<RecordingDriver>, group_id: &str) -> (GraphHandle, Arc<RecordingConnector>) {
        let connector = Arc::new(RecordingConnector::new(Arc::clone(driver)));
        let config = GraphitiConfig {
            group_id: group_id.to_string(),
            ..GraphitiConfig::default()
        };
        (GraphHandle::new(config, connector.clone()), connector)
    }

    #[tokio::test]
    async fn invalid_json_never_connects() {
        let driver = Arc::new(RecordingDriver::new());
        let (handle, connector) = handle(&driver, "");

        let err = EpisodeIngester::new(&handle)
            .add_episode(Episode::new("bad", "{not json", EpisodeType::Json))
            .await
            .expect_err("invalid JSON must be rejected");
        assert!(matches!(err, GraphitiError::Validation(_)));
        assert_eq!(connector.connect_count(), 0);
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn json_body_is_forwarded_verbatim() {
        let driver = Arc::new(RecordingDriver::new());
        let (handle, _) = handle(&driver, "");

        EpisodeIngester::new(&handle)
            .add_episode(Episode::new("doc", r#"{"a":1}"#, EpisodeType::Json))
            .await
            .expect("valid JSON episode");

        let added = driver.added_episodes();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].body, r#"{"a":1}"#);
        assert_eq!(added[0].group_id, None);
    }

    #[tokio::test]
    async fn configured_group_fills_unset_group() {
        let driver = Arc::new(RecordingDriver::new());
        let (handle, _) = handle(&driver, "podcasts");
        let ingester = EpisodeIngester::new(&handle);

        ingester.add_episode(Episode::text("a", "one")).await.unwrap();
        ingester
            .add_episode(Episode::text("b", "two").with_group_id("other"))
            .await
            .unwrap();

        let groups: Vec<_> = driver
            .added_episodes()
            .into_iter()
            .map(|e| e.group_id)
            .collect();
        assert_eq!(groups, vec![Some("podcasts".to_string()), Some("other".to_string())]);
        assert_eq!(driver.count(|c| matches!(c, DriverCall::BuildIndices)), 1);
    }
}
