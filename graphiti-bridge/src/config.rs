//! Connection configuration loaded from the environment.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{GraphitiError, Result};

pub const NEO4J_URI: &str = "NEO4J_URI";
pub const NEO4J_USER: &str = "NEO4J_USER";
pub const NEO4J_PASSWORD: &str = "NEO4J_PASSWORD";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GROUP_ID: &str = "GROUP_ID";

pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_NEO4J_USER: &str = "neo4j";
pub const DEFAULT_NEO4J_PASSWORD: &str = "password";

/// Which entry point is loading the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    /// Quickstart demo: connection values fall back to local defaults, API key optional.
    Demo,
    /// MCP server: URI, user, password and API key must all be set explicitly.
    Server,
}

/// Connection parameters for the graph database and model API.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GraphitiConfig {
    /// Neo4j connection URI (e.g. `bolt://localhost:7687`).
    #[validate(length(min = 1))]
    pub neo4j_uri: String,

    /// Neo4j username.
    #[validate(length(min = 1))]
    pub neo4j_user: String,

    /// Neo4j password.
    #[validate(length(min = 1))]
    pub neo4j_password: String,

    /// OpenAI API key used by the graph service for extraction and embeddings.
    pub openai_api_key: Option<String>,

    /// Partition id written on ingested episodes. Empty means the default partition.
    pub group_id: String,
}

impl Default for GraphitiConfig {
    fn default() -> Self {
        Self {
            neo4j_uri: DEFAULT_NEO4J_URI.to_string(),
            neo4j_user: DEFAULT_NEO4J_USER.to_string(),
            neo4j_password: DEFAULT_NEO4J_PASSWORD.to_string(),
            openai_api_key: None,
            group_id: String::new(),
        }
    }
}

impl GraphitiConfig {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent).
    pub fn from_env(mode: ConfigMode) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(mode, |name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// A variable that is set but empty counts as missing. Every missing name is
    /// collected, so the error lists all of them at once.
    ///
    /// # Errors
    /// [`GraphitiError::MissingEnv`] when a required variable is absent,
    /// [`GraphitiError::Config`] when the assembled values fail validation.
    pub fn from_lookup<F>(mode: ConfigMode, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let mut missing = Vec::new();

        let mut required = |name: &str, default: &str| match (read(name), mode) {
            (Some(v), _) => v,
            (None, ConfigMode::Demo) => default.to_string(),
            (None, ConfigMode::Server) => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let neo4j_uri = required(NEO4J_URI, DEFAULT_NEO4J_URI);
        let neo4j_user = required(NEO4J_USER, DEFAULT_NEO4J_USER);
        let neo4j_password = required(NEO4J_PASSWORD, DEFAULT_NEO4J_PASSWORD);

        let openai_api_key = read(OPENAI_API_KEY);
        if mode == ConfigMode::Server && openai_api_key.is_none() {
            missing.push(OPENAI_API_KEY.to_string());
        }

        if !missing.is_empty() {
            return Err(GraphitiError::MissingEnv(missing));
        }

        let config = Self {
            neo4j_uri,
            neo4j_user,
            neo4j_password,
            openai_api_key,
            group_id: read(GROUP_ID).unwrap_or_default(),
        };

        config
            .validate()
            .map_err(|e| GraphitiError::Config(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_demo_defaults() {
        let config = GraphitiConfig::from_lookup(ConfigMode::Demo, lookup(&[]))
            .expect("demo config should load without any variables");
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j_user, "neo4j");
        assert_eq!(config.neo4j_password, "password");
        assert!(config.openai_api_key.is_none());
        assert!(config.group_id.is_empty());
    }

    #[test]
    fn test_demo_custom_values() {
        let config = GraphitiConfig::from_lookup(
            ConfigMode::Demo,
            lookup(&[
                (NEO4J_URI, "bolt://db.example.com:7687"),
                (NEO4J_USER, "admin"),
                (NEO4J_PASSWORD, "mysecret"),
                (OPENAI_API_KEY, "sk-real-key"),
                (GROUP_ID, "team-alpha"),
            ]),
        )
        .expect("config should load");
        assert_eq!(config.neo4j_uri, "bolt://db.example.com:7687");
        assert_eq!(config.neo4j_user, "admin");
        assert_eq!(config.neo4j_password, "mysecret");
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-real-key"));
        assert_eq!(config.group_id, "team-alpha");
    }

    #[test]
    fn test_demo_empty_value_falls_back_to_default() {
        let config =
            GraphitiConfig::from_lookup(ConfigMode::Demo, lookup(&[(NEO4J_USER, "")]))
                .expect("config should load");
        assert_eq!(config.neo4j_user, "neo4j");
    }

    #[test]
    fn test_server_requires_all_four() {
        let err = GraphitiConfig::from_lookup(ConfigMode::Server, lookup(&[]))
            .expect_err("server mode must refuse empty environment");
        assert_eq!(
            err.missing_vars(),
            &[NEO4J_URI, NEO4J_USER, NEO4J_PASSWORD, OPENAI_API_KEY]
        );
    }

    #[test]
    fn test_server_reports_only_missing_names() {
        let err = GraphitiConfig::from_lookup(
            ConfigMode::Server,
            lookup(&[
                (NEO4J_URI, "bolt://localhost:7687"),
                (NEO4J_USER, "neo4j"),
                (NEO4J_PASSWORD, ""),
            ]),
        )
        .expect_err("password and key are missing");
        assert_eq!(err.missing_vars(), &[NEO4J_PASSWORD, OPENAI_API_KEY]);
        assert!(err.to_string().contains("NEO4J_PASSWORD, OPENAI_API_KEY"));
    }

    #[test]
    fn test_server_complete_environment() {
        let config = GraphitiConfig::from_lookup(
            ConfigMode::Server,
            lookup(&[
                (NEO4J_URI, "bolt://graph:7687"),
                (NEO4J_USER, "neo4j"),
                (NEO4J_PASSWORD, "s3cret"),
                (OPENAI_API_KEY, "sk-test"),
            ]),
        )
        .expect("complete server config should load");
        assert_eq!(config.neo4j_uri, "bolt://graph:7687");
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_config_default_matches_demo_defaults() {
        let config = GraphitiConfig::default();
        assert_eq!(config.neo4j_uri, DEFAULT_NEO4J_URI);
        assert_eq!(config.neo4j_user, DEFAULT_NEO4J_USER);
        assert_eq!(config.neo4j_password, DEFAULT_NEO4J_PASSWORD);
    }
}
