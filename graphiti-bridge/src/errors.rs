//! Error types for graphiti-bridge.

use std::sync::Arc;

/// Alias for Results returning [`GraphitiError`].
pub type Result<T> = std::result::Result<T, GraphitiError>;

/// Top-level error type for graphiti-bridge.
#[derive(Debug, thiserror::Error)]
pub enum GraphitiError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The shared graph client failed to initialize; every caller gets the same cause.
    #[error("graph client initialization failed: {0}")]
    Initialization(Arc<GraphitiError>),
}

impl GraphitiError {
    /// Whether the error text looks like a rejected login.
    ///
    /// Classification is by keyword only (`unauthorized`, `authentication`), matching
    /// whatever wording the database driver happens to produce.
    pub fn is_authentication_failure(&self) -> bool {
        let text = self.to_string().to_lowercase();
        text.contains("unauthorized") || text.contains("authentication")
    }

    /// Names of the missing variables, if this is a [`GraphitiError::MissingEnv`].
    pub fn missing_vars(&self) -> &[String] {
        match self {
            GraphitiError::MissingEnv(vars) => vars,
            _ => &[],
        }
    }
}

impl From<neo4rs::Error> for GraphitiError {
    fn from(e: neo4rs::Error) -> Self {
        GraphitiError::Driver(e.to_string())
    }
}

impl From<neo4rs::DeError> for GraphitiError {
    fn from(e: neo4rs::DeError) -> Self {
        GraphitiError::Driver(format!("unexpected record shape: {e}"))
    }
}
