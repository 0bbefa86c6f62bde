//! KGQA Core Library
//!
//! Domain model, configuration, intent classification and traversal strategy
//! selection for knowledge-graph grounded question answering.

pub mod config;
pub mod context;
pub mod error;
pub mod intent;
pub mod model;

pub use config::{DomainConfig, GENERAL_INTENT};
pub use context::ContextGenerator;
pub use error::{KgqaError, KgqaResult};
pub use model::{EntryNode, Node, Relationship, Subgraph};
