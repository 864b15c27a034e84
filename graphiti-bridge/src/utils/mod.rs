//! Shared utilities.
//!
//! Includes:
//! - Date/time helpers (Neo4j temporal strings <-> chrono)
//! - Full-text query preparation (whitespace folding, Lucene escaping)
//! - Display truncation

pub mod datetime;
pub mod text;

pub use datetime::{format_neo4j_datetime, parse_neo4j_datetime};
pub use text::{fulltext_query, lucene_sanitize, normalize_whitespace, truncate_with_ellipsis};
