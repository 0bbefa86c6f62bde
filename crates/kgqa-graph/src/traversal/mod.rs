//! Smart traversal engine.
//!
//! Five strategies, one output shape:
//!
//! - `targeted`: one named relationship hop from or to the entry node
//! - `chained`: a fixed sequence of typed hops
//! - `variable_hop`: free 1..N neighbourhood, intermediate edges included
//! - `shortest_path`: the shortest undirected path between two entry nodes
//! - `shared_neighbor`: nodes adjacent to all entry nodes
//!
//! Whatever runs, callers get a `Subgraph` of deduplicated nodes and
//! relationships plus the strategy name and the depth actually reached.

pub mod engine;
pub mod normalize;
pub mod synthesize;

pub use engine::TraversalEngine;
pub use normalize::normalize;
pub use synthesize::synthesize;
