//! Intents: what a question is asking for, and how to traverse for it.

pub mod classifier;
pub mod model;
pub mod selector;

pub use classifier::IntentClassifier;
pub use model::{EntryAnchor, HopSpec, IntentDefinition, StrategyKind, TraversalStrategy};
pub use selector::{select_strategy, Selection};
