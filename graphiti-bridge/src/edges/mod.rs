//! Edge types read back from the knowledge graph.
//!
//! - [`EntityEdge`](entity::EntityEdge) — bi-temporal fact between two entities (RELATES_TO)

pub mod entity;

pub use entity::EntityEdge;
