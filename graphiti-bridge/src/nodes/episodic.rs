//! Episode — a unit of content handed to the graph for ingestion.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{GraphitiError, Result};

/// The source type of an episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeType {
    /// Free text (transcripts, notes, messages).
    #[default]
    Text,
    /// A JSON document serialised to text.
    Json,
}

impl EpisodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeType::Text => "text",
            EpisodeType::Json => "json",
        }
    }
}

impl std::fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An episode to ingest.
///
/// Names are caller-assigned and not required to be unique. The graph service
/// owns everything derived from the episode once it has been handed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub name: String,
    pub body: String,
    pub kind: EpisodeType,
    pub source_description: String,
    pub reference_time: DateTime<Utc>,
    /// Partition override; `None` uses the configured group.
    pub group_id: Option<String>,
}

impl Episode {
    /// Create an episode of any kind, stamped with the current time.
    pub fn new(name: impl Into<String>, body: impl Into<String>, kind: EpisodeType) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            kind,
            source_description: String::new(),
            reference_time: Utc::now(),
            group_id: None,
        }
    }

    /// A free-text episode.
    pub fn text(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(name, body, EpisodeType::Text)
    }

    /// A JSON episode; the document is serialised to its compact text form.
    pub fn json(name: impl Into<String>, document: &serde_json::Value) -> Result<Self> {
        let body = serde_json::to_string(document)?;
        Ok(Self::new(name, body, EpisodeType::Json))
    }

    pub fn with_source_description(mut self, description: impl Into<String>) -> Self {
        self.source_description = description.into();
        self
    }

    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = reference_time;
        self
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Check the body against its declared kind.
    ///
    /// # Errors
    /// [`GraphitiError::Validation`] when a `json` episode's body does not parse.
    pub fn validate(&self) -> Result<()> {
        if self.kind == EpisodeType::Json {
            serde_json::from_str::<serde_json::Value>(&self.body).map_err(|e| {
                GraphitiError::Validation(format!(
                    "content of episode '{}' is not valid JSON: {e}",
                    self.name
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_episode_type_wire_names() {
        assert_eq!(serde_json::to_string(&EpisodeType::Text).unwrap(), "\"text\"");
        assert_eq!(serde_json::to_string(&EpisodeType::Json).unwrap(), "\"json\"");
        let parsed: EpisodeType = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(parsed, EpisodeType::Json);
    }

    #[test]
    fn test_episode_type_rejects_unknown() {
        assert!(serde_json::from_str::<EpisodeType>("\"message\"").is_err());
    }

    #[test]
    fn test_episode_type_default_is_text() {
        assert_eq!(EpisodeType::default(), EpisodeType::Text);
        assert_eq!(EpisodeType::Json.to_string(), "json");
    }

    #[test]
    fn test_text_episode_builder() {
        let at = chrono::DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let episode = Episode::text("Freakonomics Radio 0", "Kamala Harris is the AG.")
            .with_source_description("podcast transcript")
            .with_reference_time(at)
            .with_group_id("podcasts");

        assert_eq!(episode.kind, EpisodeType::Text);
        assert_eq!(episode.source_description, "podcast transcript");
        assert_eq!(episode.reference_time, at);
        assert_eq!(episode.group_id.as_deref(), Some("podcasts"));
        assert!(episode.validate().is_ok());
    }

    #[test]
    fn test_json_episode_serialises_document() {
        let episode = Episode::json("meta", &json!({"name": "Gavin Newsom"})).unwrap();
        assert_eq!(episode.kind, EpisodeType::Json);
        assert_eq!(episode.body, r#"{"name":"Gavin Newsom"}"#);
        assert!(episode.validate().is_ok());
    }

    #[test]
    fn test_invalid_json_body_is_rejected() {
        let episode = Episode::new("broken", "{not json", EpisodeType::Json);
        match episode.validate() {
            Err(GraphitiError::Validation(msg)) => {
                assert!(msg.contains("broken"));
                assert!(msg.contains("not valid JSON"));
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_text_body_is_never_parsed() {
        let episode = Episode::new("plain", "{not json", EpisodeType::Text);
        assert!(episode.validate().is_ok());
    }
}
