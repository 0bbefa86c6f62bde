//! # KGQA Graph
//!
//! Neo4j integration for KGQA.
//!
//! Provides the connection client, entry-node extraction from question text
//! and the intent-driven traversal engine.

pub mod client;
pub mod extraction;
pub mod store;
pub mod traversal;

pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use extraction::EntityExtractor;
pub use store::{CypherQuery, EdgeRow, GraphStore, NodeRow, QueryParam};
pub use traversal::TraversalEngine;
