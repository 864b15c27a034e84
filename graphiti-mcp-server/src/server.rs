use std::sync::Arc;

use graphiti_bridge::edges::EntityEdge;
use graphiti_bridge::format::{community_response, entity_response, search_response};
use graphiti_bridge::ingest::EpisodeIngester;
use graphiti_bridge::nodes::Episode;
use graphiti_bridge::query::QueryDispatcher;
use graphiti_bridge::GraphHandle;
use rmcp::{
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, Content, Implementation,
        ListResourcesResult, ListToolsResult, PaginatedRequestParam, RawResource,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities,
        ServerInfo, Tool,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler,
};
use tracing::{debug, warn};

use crate::resources::{self, ServerStats, JSON_MIME, RESOURCES};
use crate::tools::{
    entity_query, error_text, tool_specs, ToolArguments, ToolCall, ToolError, COMMUNITY_QUERY,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn ok(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

fn err(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}

/// The tool registry as MCP tool definitions.
pub fn tool_definitions() -> Vec<Tool> {
    tool_specs()
        .into_iter()
        .map(|spec| Tool::new(spec.name, spec.description, spec.input_schema))
        .collect()
}

// ─── Server ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GraphitiMcpServer {
    handle: Arc<GraphHandle>,
    stats: Arc<ServerStats>,
}

impl GraphitiMcpServer {
    pub fn new(handle: Arc<GraphHandle>, stats: Arc<ServerStats>) -> Self {
        Self { handle, stats }
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    /// Run one tool call and return its response text.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Option<ToolArguments>,
    ) -> Result<String, ToolError> {
        let call = ToolCall::parse(name, arguments)?;
        self.dispatch(call).await
    }

    /// Run one tool call, flattening any failure into an error response.
    pub async fn call(&self, name: &str, arguments: Option<ToolArguments>) -> CallToolResult {
        match self.execute(name, arguments).await {
            Ok(text) => ok(text),
            Err(e) => {
                warn!(tool = %name, error = %e, "tool call failed");
                self.stats.tool_error();
                err(error_text(name, &e))
            }
        }
    }

    // ── Tool implementations ──────────────────────────────────────────────────

    async fn dispatch(&self, call: ToolCall) -> Result<String, ToolError> {
        debug!(tool = call.name(), "dispatch");
        match call {
            ToolCall::AddEpisode(args) => {
                let episode = Episode::new(args.name.clone(), args.content, args.episode_type)
                    .with_source_description(args.source_description);
                EpisodeIngester::new(&self.handle).add_episode(episode).await?;
                self.stats.episode_added();
                Ok(format!(
                    "Successfully added episode '{}' to the knowledge graph",
                    args.name
                ))
            }
            ToolCall::SearchGraph(args) => {
                let facts = self.search(&args.query, args.limit).await?;
                Ok(search_response(&args.query, &facts))
            }
            ToolCall::GetEntities(args) => {
                let query = entity_query(args.entity_name.as_deref());
                let facts = self.search(&query, args.limit).await?;
                Ok(entity_response(&facts))
            }
            ToolCall::GetCommunities(args) => {
                let facts = self.search(COMMUNITY_QUERY, args.limit).await?;
                Ok(community_response(&facts))
            }
        }
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<EntityEdge>, ToolError> {
        let facts = QueryDispatcher::new(&self.handle)
            .search(query, Some(limit as usize), None)
            .await?;
        self.stats.search_served();
        Ok(facts)
    }
}

// ─── ServerHandler ────────────────────────────────────────────────────────────

impl ServerHandler for GraphitiMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Knowledge-graph tools backed by Graphiti. Use add_episode to store text or \
                 JSON, search_graph to retrieve facts, get_entities and get_communities for \
                 broad listings."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(tool_definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.call(&request.name, request.arguments).await)
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = RESOURCES
            .iter()
            .map(|(uri, name, description)| {
                let mut raw = RawResource::new(*uri, *name);
                raw.description = Some(description.to_string());
                raw.mime_type = Some(JSON_MIME.to_string());
                raw.no_annotation()
            })
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        debug!(uri = %request.uri, "read_resource");
        match resources::read(&request.uri, &self.stats) {
            Some(Ok(body)) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(body, request.uri)],
            }),
            Some(Err(e)) => Err(McpError::internal_error(e.to_string(), None)),
            None => Err(McpError::resource_not_found(
                format!("unknown resource: {}", request.uri),
                None,
            )),
        }
    }
}
