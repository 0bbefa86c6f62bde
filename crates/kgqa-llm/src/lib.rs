//! # KGQA LLM
//!
//! Grounded answer generation for KGQA.
//!
//! The model only ever sees the knowledge-graph context rendered from a
//! traversal, and is told to answer from that context alone.

pub mod ollama;
pub mod prompt;

pub use ollama::OllamaClient;
