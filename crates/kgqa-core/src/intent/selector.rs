//! Strategy selection and entry-node cardinality fallbacks.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::model::{IntentDefinition, StrategyKind, TraversalStrategy};
use crate::error::{KgqaError, KgqaResult};
use crate::model::EntryNode;

/// The outcome of strategy selection: what will actually run, and on which anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub strategy: TraversalStrategy,
    pub entry_nodes: Vec<EntryNode>,
    /// The strategy the intent asked for, before any fallback.
    pub requested: StrategyKind,
}

impl Selection {
    pub fn fell_back(&self) -> bool {
        self.strategy.kind() != self.requested
    }
}

/// Pick the traversal for an intent and adjust the entry nodes to fit it.
///
/// Configuration problems are reported before cardinality problems, so a bad
/// intent fails the same way regardless of what the extractor found.
pub fn select_strategy(intent: &IntentDefinition, entry_nodes: &[EntryNode]) -> KgqaResult<Selection> {
    let strategy = intent.resolve()?;
    let requested = strategy.kind();

    let mut distinct = dedup_by_id(entry_nodes);
    if distinct.is_empty() {
        return Err(KgqaError::NoEntryNodes);
    }

    let strategy = match strategy {
        TraversalStrategy::ShortestPath { .. } if distinct.len() < 2 => {
            let (min_hops, max_hops) = intent.variable_hop_bounds()?;
            warn!(
                entry = %distinct[0].name,
                min_hops,
                max_hops,
                "shortest_path needs two entry nodes, falling back to variable_hop"
            );
            TraversalStrategy::VariableHop { min_hops, max_hops }
        }
        TraversalStrategy::ShortestPath { max_hops } => {
            if distinct.len() > 2 {
                debug!(dropped = distinct.len() - 2, "shortest_path uses the first two entry nodes");
                distinct.truncate(2);
            }
            TraversalStrategy::ShortestPath { max_hops }
        }
        TraversalStrategy::SharedNeighbor { .. } if distinct.len() < 2 => {
            return Err(KgqaError::InsufficientEntryNodes {
                strategy: requested.as_str().to_string(),
                required: 2,
                found: distinct.len(),
            });
        }
        other => other,
    };

    debug!(
        requested = %requested,
        selected = strategy.name(),
        entries = distinct.len(),
        "Strategy selected"
    );

    Ok(Selection {
        strategy,
        entry_nodes: distinct,
        requested,
    })
}

/// Keep the first occurrence of each id, preserving confidence order.
fn dedup_by_id(entry_nodes: &[EntryNode]) -> Vec<EntryNode> {
    let mut seen = HashSet::new();
    entry_nodes
        .iter()
        .filter(|n| seen.insert(n.id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::model::HopSpec;

    fn aspirin() -> EntryNode {
        EntryNode::new("n1", "Drug", "Aspirin")
    }

    fn ibuprofen() -> EntryNode {
        EntryNode::new("n4", "Drug", "Ibuprofen")
    }

    #[test]
    fn test_zero_entry_nodes_fails_for_every_strategy() {
        let mut targeted = IntentDefinition::new("targeted");
        targeted.relationship = Some("CAUSES".to_string());
        let mut chained = IntentDefinition::new("chained");
        chained.hops = Some(vec![HopSpec {
            relationship: "TREATS".to_string(),
            target_label: None,
        }]);

        let intents = vec![
            targeted,
            chained,
            IntentDefinition::new("variable_hop"),
            IntentDefinition::new("shortest_path"),
            IntentDefinition::new("shared_neighbor"),
        ];

        for intent in intents {
            let err = select_strategy(&intent, &[]).unwrap_err();
            assert!(matches!(err, KgqaError::NoEntryNodes), "{}: {:?}", intent.strategy, err);
        }
    }

    #[test]
    fn test_unknown_strategy_is_configuration_error() {
        let intent = IntentDefinition::new("community_detection");
        let err = select_strategy(&intent, &[aspirin()]).unwrap_err();
        assert!(matches!(err, KgqaError::Configuration(_)));
    }

    #[test]
    fn test_shortest_path_single_entry_falls_back() {
        let intent = IntentDefinition::new("shortest_path");
        let selection = select_strategy(&intent, &[aspirin()]).unwrap();

        assert!(selection.fell_back());
        assert_eq!(selection.requested, StrategyKind::ShortestPath);
        assert_eq!(
            selection.strategy,
            TraversalStrategy::VariableHop { min_hops: 1, max_hops: 2 }
        );
        assert_eq!(selection.entry_nodes, vec![aspirin()]);
    }

    #[test]
    fn test_shortest_path_fallback_uses_configured_bounds() {
        let mut intent = IntentDefinition::new("shortest_path");
        intent.min_hops = Some(2);
        intent.max_hops = Some(3);
        let selection = select_strategy(&intent, &[aspirin()]).unwrap();
        assert_eq!(
            selection.strategy,
            TraversalStrategy::VariableHop { min_hops: 2, max_hops: 3 }
        );
    }

    #[test]
    fn test_duplicate_entry_counts_once() {
        let intent = IntentDefinition::new("shortest_path");
        let selection = select_strategy(&intent, &[aspirin(), aspirin()]).unwrap();
        assert_eq!(selection.strategy.kind(), StrategyKind::VariableHop);
        assert_eq!(selection.entry_nodes.len(), 1);
    }

    #[test]
    fn test_shortest_path_keeps_first_two_entries() {
        let intent = IntentDefinition::new("shortest_path");
        let third = EntryNode::new("n9", "Disease", "Headache");
        let selection = select_strategy(&intent, &[aspirin(), ibuprofen(), third]).unwrap();

        assert!(!selection.fell_back());
        assert_eq!(selection.entry_nodes, vec![aspirin(), ibuprofen()]);
    }

    #[test]
    fn test_shared_neighbor_single_entry_is_insufficient() {
        let intent = IntentDefinition::new("shared_neighbor");
        let err = select_strategy(&intent, &[aspirin()]).unwrap_err();
        match err {
            KgqaError::InsufficientEntryNodes { required, found, .. } => {
                assert_eq!(required, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_shared_neighbor_with_two_entries() {
        let mut intent = IntentDefinition::new("shared_neighbor");
        intent.min_connections = Some(2);
        let selection = select_strategy(&intent, &[aspirin(), ibuprofen()]).unwrap();
        assert_eq!(
            selection.strategy,
            TraversalStrategy::SharedNeighbor { min_connections: Some(2) }
        );
        assert_eq!(selection.entry_nodes.len(), 2);
    }

    #[test]
    fn test_chained_empty_hops_reported_before_cardinality() {
        let mut intent = IntentDefinition::new("chained");
        intent.hops = Some(vec![]);
        let err = select_strategy(&intent, &[]).unwrap_err();
        assert!(matches!(err, KgqaError::Configuration(_)));
    }
}
