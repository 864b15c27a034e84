//! MCP tool surface over a Graphiti knowledge graph.
//!
//! Four tools (`add_episode`, `search_graph`, `get_entities`, `get_communities`) and two
//! JSON resources, served over stdio or streamable HTTP.

pub mod config;
pub mod resources;
pub mod server;
pub mod startup;
pub mod tools;

pub use server::GraphitiMcpServer;
