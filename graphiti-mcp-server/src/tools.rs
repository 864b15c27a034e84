//! Tool registry: argument types, schemas and parsing of raw tool calls.

use std::sync::Arc;

use graphiti_bridge::nodes::EpisodeType;
use graphiti_bridge::GraphitiError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

/// Raw arguments as they arrive on the wire.
pub type ToolArguments = Map<String, Value>;

pub const ADD_EPISODE: &str = "add_episode";
pub const SEARCH_GRAPH: &str = "search_graph";
pub const GET_ENTITIES: &str = "get_entities";
pub const GET_COMMUNITIES: &str = "get_communities";

pub const DEFAULT_SOURCE_DESCRIPTION: &str = "MCP client input";

/// Every tool error response starts with this.
pub const ERROR_MARKER: &str = "Error:";

/// Query used for entity listings, optionally narrowed to one name.
pub fn entity_query(entity_name: Option<&str>) -> String {
    match entity_name {
        Some(name) => format!("entity: {name}"),
        None => "entity".to_string(),
    }
}

pub const COMMUNITY_QUERY: &str = "community";

fn default_source_description() -> String {
    DEFAULT_SOURCE_DESCRIPTION.to_string()
}

fn default_search_limit() -> u32 {
    5
}

fn default_listing_limit() -> u32 {
    10
}

// ─── Parameter types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct AddEpisodeArgs {
    /// Episode name.
    pub name: String,
    /// Episode content. Must be a JSON document when `episode_type` is `json`.
    pub content: String,
    /// Content type: `text` or `json`.
    #[serde(default)]
    pub episode_type: EpisodeType,
    /// Where the content came from.
    #[serde(default = "default_source_description")]
    pub source_description: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct SearchGraphArgs {
    /// Natural-language search query.
    #[validate(length(min = 1))]
    pub query: String,
    /// Maximum number of results.
    #[serde(default = "default_search_limit")]
    #[validate(range(min = 1, max = 20))]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct GetEntitiesArgs {
    /// Entity name to narrow the listing to.
    #[serde(default)]
    pub entity_name: Option<String>,
    /// Maximum number of results.
    #[serde(default = "default_listing_limit")]
    #[validate(range(min = 1, max = 50))]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct GetCommunitiesArgs {
    /// Maximum number of results.
    #[serde(default = "default_listing_limit")]
    #[validate(range(min = 1, max = 20))]
    pub limit: u32,
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// A parsed, validated tool call.
#[derive(Debug, Clone)]
pub enum ToolCall {
    AddEpisode(AddEpisodeArgs),
    SearchGraph(SearchGraphArgs),
    GetEntities(GetEntitiesArgs),
    GetCommunities(GetCommunitiesArgs),
}

impl ToolCall {
    /// Resolve `name` and decode `arguments` against that tool's argument type.
    pub fn parse(name: &str, arguments: Option<ToolArguments>) -> Result<Self, ToolError> {
        let args = Value::Object(arguments.unwrap_or_default());
        let call = match name {
            ADD_EPISODE => ToolCall::AddEpisode(decode(name, args)?),
            SEARCH_GRAPH => ToolCall::SearchGraph(decode(name, args)?),
            GET_ENTITIES => ToolCall::GetEntities(decode(name, args)?),
            GET_COMMUNITIES => ToolCall::GetCommunities(decode(name, args)?),
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(call)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::AddEpisode(_) => ADD_EPISODE,
            ToolCall::SearchGraph(_) => SEARCH_GRAPH,
            ToolCall::GetEntities(_) => GET_ENTITIES,
            ToolCall::GetCommunities(_) => GET_COMMUNITIES,
        }
    }
}

fn decode<T: DeserializeOwned + Validate>(tool: &str, args: Value) -> Result<T, ToolError> {
    let invalid = |reason: String| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason,
    };
    let parsed: T = serde_json::from_value(args).map_err(|e| invalid(e.to_string()))?;
    parsed.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(parsed)
}

/// Failure of a single tool call. Rendered as text, never as a protocol fault.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Failed(#[from] GraphitiError),
}

/// Text of the error response for `tool`.
pub fn error_text(tool: &str, error: &ToolError) -> String {
    match error {
        ToolError::Failed(inner) => {
            format!("{ERROR_MARKER} executing tool '{tool}' failed: {inner}")
        }
        other => format!("{ERROR_MARKER} {other}"),
    }
}

// ─── Schemas ──────────────────────────────────────────────────────────────────

/// Name, description and JSON input schema of one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Arc<ToolArguments>,
}

/// The four tools, in registry order.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: ADD_EPISODE,
            description: "Add an episode (free text or a JSON document) to the knowledge graph.",
            input_schema: input_schema::<AddEpisodeArgs>(),
        },
        ToolSpec {
            name: SEARCH_GRAPH,
            description: "Search the knowledge graph for facts matching a natural-language query.",
            input_schema: input_schema::<SearchGraphArgs>(),
        },
        ToolSpec {
            name: GET_ENTITIES,
            description: "List facts about entities in the knowledge graph, optionally for one \
                          entity name. Approximated with a free-text search for 'entity'.",
            input_schema: input_schema::<GetEntitiesArgs>(),
        },
        ToolSpec {
            name: GET_COMMUNITIES,
            description: "List facts about communities in the knowledge graph. Approximated \
                          with a free-text search for 'community'.",
            input_schema: input_schema::<GetCommunitiesArgs>(),
        },
    ]
}

fn input_schema<T: JsonSchema>() -> Arc<ToolArguments> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => Arc::new(map),
        _ => Arc::new(ToolArguments::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Option<ToolArguments> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[test]
    fn add_episode_defaults() {
        let call = ToolCall::parse(ADD_EPISODE, args(json!({"name": "n", "content": "c"}))).unwrap();
        match call {
            ToolCall::AddEpisode(a) => {
                assert_eq!(a.episode_type, EpisodeType::Text);
                assert_eq!(a.source_description, DEFAULT_SOURCE_DESCRIPTION);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn add_episode_requires_name_and_content() {
        let err = ToolCall::parse(ADD_EPISODE, args(json!({"name": "n"}))).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert!(err.to_string().contains("content"));
    }

    #[test]
    fn episode_type_outside_enumeration_is_rejected() {
        let err = ToolCall::parse(
            ADD_EPISODE,
            args(json!({"name": "n", "content": "c", "episode_type": "message"})),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn limits_default_per_tool() {
        match ToolCall::parse(SEARCH_GRAPH, args(json!({"query": "q"}))).unwrap() {
            ToolCall::SearchGraph(a) => assert_eq!(a.limit, 5),
            other => panic!("unexpected {other:?}"),
        }
        match ToolCall::parse(GET_ENTITIES, None).unwrap() {
            ToolCall::GetEntities(a) => {
                assert_eq!(a.limit, 10);
                assert!(a.entity_name.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        match ToolCall::parse(GET_COMMUNITIES, None).unwrap() {
            ToolCall::GetCommunities(a) => assert_eq!(a.limit, 10),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn limits_outside_bounds_are_rejected() {
        for (tool, value) in [
            (SEARCH_GRAPH, json!({"query": "q", "limit": 0})),
            (SEARCH_GRAPH, json!({"query": "q", "limit": 21})),
            (GET_ENTITIES, json!({"limit": 51})),
            (GET_COMMUNITIES, json!({"limit": 21})),
            (GET_COMMUNITIES, json!({"limit": -1})),
        ] {
            let err = ToolCall::parse(tool, args(value)).unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments { .. }), "{tool}");
        }
        assert!(ToolCall::parse(GET_ENTITIES, args(json!({"limit": 50}))).is_ok());
    }

    #[test]
    fn unknown_tool() {
        let err = ToolCall::parse("delete_graph", None).unwrap_err();
        assert_eq!(error_text("delete_graph", &err), "Error: unknown tool: delete_graph");
    }

    #[test]
    fn failures_name_the_tool() {
        let err = ToolError::from(GraphitiError::Driver("connection reset".to_string()));
        let text = error_text(SEARCH_GRAPH, &err);
        assert!(text.starts_with(ERROR_MARKER));
        assert!(text.contains("'search_graph'"));
        assert!(text.contains("connection reset"));
    }

    #[test]
    fn entity_queries() {
        assert_eq!(entity_query(None), "entity");
        assert_eq!(entity_query(Some("Gavin Newsom")), "entity: Gavin Newsom");
    }

    #[test]
    fn schemas_carry_required_fields_and_bounds() {
        let specs = tool_specs();
        let names: Vec<_> = specs.iter().map(|s| s.name).collect();
        assert_eq!(names, vec![ADD_EPISODE, SEARCH_GRAPH, GET_ENTITIES, GET_COMMUNITIES]);

        let add = Value::Object((*specs[0].input_schema).clone());
        let required = add["required"].as_array().unwrap();
        assert!(required.contains(&json!("name")));
        assert!(required.contains(&json!("content")));
        assert!(!required.contains(&json!("episode_type")));

        let search = Value::Object((*specs[1].input_schema).clone());
        assert_eq!(search["properties"]["limit"]["minimum"], json!(1));
        assert_eq!(search["properties"]["limit"]["maximum"], json!(20));
        assert_eq!(search["properties"]["limit"]["default"], json!(5));
    }
}
