//! # graphiti-bridge
//!
//! Client layer over a [Graphiti](https://github.com/getzep/graphiti)-schema knowledge
//! graph. The heavy lifting (entity extraction, temporal fact tracking, hybrid retrieval)
//! belongs to the graph service; this crate wires configuration, owns the single shared
//! connection, and turns episodes and queries into collaborator calls.
//!
//! ## Architecture
//!
//! - **Configuration**: environment driven, fail-fast on missing values ([`config`])
//! - **Lazy handle**: one driver per process, schema set up once ([`handle`])
//! - **Ingestion**: dated text/JSON episodes ([`ingest`])
//! - **Queries**: fact search with optional center-node rerank, recipe-driven node search ([`query`])
//! - **Formatting**: log lines and tool-response text ([`format`])

pub mod config;
pub mod edges;
pub mod errors;
pub mod nodes;

pub mod driver;
pub mod handle;
pub mod search;

pub mod demo;
pub mod format;
pub mod ingest;
pub mod query;
pub mod utils;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{ConfigMode, GraphitiConfig};
pub use errors::{GraphitiError, Result};
pub use handle::GraphHandle;
