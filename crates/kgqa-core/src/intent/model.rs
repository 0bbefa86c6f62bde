//! Intent definitions and traversal strategy types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KgqaError, KgqaResult};

/// Hard cap on variable-length exploration depth.
pub const MAX_VARIABLE_HOPS: u32 = 4;

/// Hard cap on shortest-path search depth.
pub const MAX_SHORTEST_PATH_HOPS: u32 = 6;

pub const DEFAULT_MIN_HOPS: u32 = 1;
pub const DEFAULT_MAX_HOPS: u32 = 2;

/// The five traversal shapes the engine knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Targeted,
    Chained,
    VariableHop,
    ShortestPath,
    SharedNeighbor,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Targeted => "targeted",
            StrategyKind::Chained => "chained",
            StrategyKind::VariableHop => "variable_hop",
            StrategyKind::ShortestPath => "shortest_path",
            StrategyKind::SharedNeighbor => "shared_neighbor",
        }
    }

    /// Parse a configured strategy name. Unknown names are a configuration error.
    pub fn parse(s: &str) -> KgqaResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "targeted" => Ok(Self::Targeted),
            "chained" => Ok(Self::Chained),
            "variable_hop" => Ok(Self::VariableHop),
            "shortest_path" => Ok(Self::ShortestPath),
            "shared_neighbor" => Ok(Self::SharedNeighbor),
            other => Err(KgqaError::configuration(format!(
                "unrecognized traversal strategy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of a targeted relationship the entry node binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryAnchor {
    /// Entry node is the relationship source: follow out-edges.
    #[default]
    Source,
    /// Entry node is the relationship target: follow in-edges.
    Target,
    /// Either end: undirected match.
    Either,
}

/// One typed step of a chained traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopSpec {
    pub relationship: String,
    #[serde(default)]
    pub target_label: Option<String>,
}

/// An intent as written in the configuration document.
///
/// Every field past `strategy` is optional on disk; `resolve` checks that the
/// chosen strategy has what it needs and produces a `TraversalStrategy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub strategy: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub entry_anchor: Option<EntryAnchor>,
    #[serde(default)]
    pub source_label: Option<String>,
    #[serde(default)]
    pub target_label: Option<String>,
    #[serde(default)]
    pub entry_label: Option<String>,
    #[serde(default)]
    pub hops: Option<Vec<HopSpec>>,
    #[serde(default)]
    pub min_hops: Option<u32>,
    #[serde(default)]
    pub max_hops: Option<u32>,
    #[serde(default)]
    pub min_connections: Option<u32>,
}

impl IntentDefinition {
    /// A bare definition for the given strategy name, all parameters unset.
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            keywords: Vec::new(),
            relationship: None,
            entry_anchor: None,
            source_label: None,
            target_label: None,
            entry_label: None,
            hops: None,
            min_hops: None,
            max_hops: None,
            min_connections: None,
        }
    }

    pub fn kind(&self) -> KgqaResult<StrategyKind> {
        StrategyKind::parse(&self.strategy)
    }

    /// Configured hop bounds for neighbourhood exploration, defaults applied
    /// and the upper bound capped at `MAX_VARIABLE_HOPS`.
    pub fn variable_hop_bounds(&self) -> KgqaResult<(u32, u32)> {
        let min_hops = self.min_hops.unwrap_or(DEFAULT_MIN_HOPS).max(1);
        let max_hops = self
            .max_hops
            .unwrap_or(DEFAULT_MAX_HOPS)
            .min(MAX_VARIABLE_HOPS);

        if min_hops > max_hops {
            return Err(KgqaError::configuration(format!(
                "min_hops ({}) exceeds max_hops ({}, capped at {})",
                min_hops, max_hops, MAX_VARIABLE_HOPS
            )));
        }
        Ok((min_hops, max_hops))
    }

    /// Check the parameters required by the declared strategy and build the
    /// closed `TraversalStrategy` value.
    pub fn resolve(&self) -> KgqaResult<TraversalStrategy> {
        match self.kind()? {
            StrategyKind::Targeted => {
                let relationship = non_empty(self.relationship.as_deref()).ok_or_else(|| {
                    KgqaError::configuration("targeted strategy requires a 'relationship'")
                })?;
                Ok(TraversalStrategy::Targeted {
                    relationship: relationship.to_string(),
                    anchor: self.entry_anchor.unwrap_or_default(),
                    source_label: non_empty(self.source_label.as_deref()).map(str::to_string),
                    target_label: non_empty(self.target_label.as_deref()).map(str::to_string),
                })
            }
            StrategyKind::Chained => {
                let hops = self.hops.clone().unwrap_or_default();
                if hops.is_empty() {
                    return Err(KgqaError::configuration(
                        "chained strategy requires a non-empty 'hops' sequence",
                    ));
                }
                if let Some(pos) = hops.iter().position(|h| h.relationship.trim().is_empty()) {
                    return Err(KgqaError::configuration(format!(
                        "chained hop {} has an empty relationship",
                        pos + 1
                    )));
                }
                Ok(TraversalStrategy::Chained {
                    hops,
                    entry_label: non_empty(self.entry_label.as_deref()).map(str::to_string),
                })
            }
            StrategyKind::VariableHop => {
                let (min_hops, max_hops) = self.variable_hop_bounds()?;
                Ok(TraversalStrategy::VariableHop { min_hops, max_hops })
            }
            StrategyKind::ShortestPath => {
                // Single-entry fallback runs variable_hop with these bounds.
                self.variable_hop_bounds()?;
                Ok(TraversalStrategy::ShortestPath {
                    max_hops: self
                        .max_hops
                        .unwrap_or(MAX_SHORTEST_PATH_HOPS)
                        .clamp(1, MAX_SHORTEST_PATH_HOPS),
                })
            }
            StrategyKind::SharedNeighbor => Ok(TraversalStrategy::SharedNeighbor {
                min_connections: self.min_connections,
            }),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A fully-resolved traversal, carrying only what its query shape needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalStrategy {
    Targeted {
        relationship: String,
        anchor: EntryAnchor,
        source_label: Option<String>,
        target_label: Option<String>,
    },
    Chained {
        hops: Vec<HopSpec>,
        entry_label: Option<String>,
    },
    VariableHop {
        min_hops: u32,
        max_hops: u32,
    },
    ShortestPath {
        max_hops: u32,
    },
    SharedNeighbor {
        /// Unset means "adjacent to every entry node".
        min_connections: Option<u32>,
    },
}

impl TraversalStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            TraversalStrategy::Targeted { .. } => StrategyKind::Targeted,
            TraversalStrategy::Chained { .. } => StrategyKind::Chained,
            TraversalStrategy::VariableHop { .. } => StrategyKind::VariableHop,
            TraversalStrategy::ShortestPath { .. } => StrategyKind::ShortestPath,
            TraversalStrategy::SharedNeighbor { .. } => StrategyKind::SharedNeighbor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Deepest path this traversal may produce.
    pub fn max_depth(&self) -> u32 {
        match self {
            TraversalStrategy::Targeted { .. } => 1,
            TraversalStrategy::Chained { hops, .. } => hops.len() as u32,
            TraversalStrategy::VariableHop { max_hops, .. } => *max_hops,
            TraversalStrategy::ShortestPath { max_hops } => *max_hops,
            TraversalStrategy::SharedNeighbor { .. } => 1,
        }
    }
}
