//! Node types exchanged with the knowledge graph.
//!
//! - [`EntityNode`](entity::EntityNode) — entities returned by structured node search
//! - [`Episode`](episodic::Episode) — content handed to the graph for ingestion

pub mod entity;
pub mod episodic;

pub use entity::EntityNode;
pub use episodic::{Episode, EpisodeType};
