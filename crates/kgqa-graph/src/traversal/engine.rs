//! Intent-driven traversal: select, synthesize, execute once, normalize.

use std::sync::Arc;

use tracing::{debug, info};

use kgqa_core::config::DomainConfig;
use kgqa_core::intent::{select_strategy, IntentDefinition};
use kgqa_core::{EntryNode, KgqaError, KgqaResult, Subgraph};

use super::normalize::normalize;
use super::synthesize::synthesize;
use crate::store::GraphStore;

/// Executes intent-driven graph traversal against a `GraphStore`.
///
/// Holds no per-call state; one engine can serve concurrent queries as long
/// as the store can.
pub struct TraversalEngine<S> {
    store: S,
    config: Arc<DomainConfig>,
}

impl<S: GraphStore> TraversalEngine<S> {
    pub fn new(store: S, config: Arc<DomainConfig>) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Traverse for a named intent. Names with no configured intent run the
    /// general 1-hop exploration under the general row limit.
    pub async fn traverse(&self, intent_name: &str, entry_nodes: &[EntryNode]) -> KgqaResult<Subgraph> {
        match self.config.intent(intent_name) {
            Some(intent) => self.traverse_intent(intent, entry_nodes, None).await,
            None => {
                debug!(intent = intent_name, "No configured intent, using general traversal");
                let general = self.config.general_intent();
                let limit = self.config.general_traversal.node_limit;
                self.traverse_intent(&general, entry_nodes, Some(limit)).await
            }
        }
    }

    /// Traverse for an explicit intent definition.
    ///
    /// Issues exactly one query. Either a complete subgraph or an error comes
    /// back; nothing is retried.
    pub async fn traverse_intent(
        &self,
        intent: &IntentDefinition,
        entry_nodes: &[EntryNode],
        limit_override: Option<u32>,
    ) -> KgqaResult<Subgraph> {
        let selection = select_strategy(intent, entry_nodes)?;
        let strategy = &selection.strategy;
        let limit = limit_override.unwrap_or_else(|| self.config.limits.for_strategy(strategy.kind()));

        let query = synthesize(strategy, &selection.entry_nodes, limit);
        debug!(strategy = strategy.name(), cypher = %query.text, "Running traversal query");

        let rows = self
            .store
            .fetch_edges(&query)
            .await
            .map_err(|e| KgqaError::store_unavailable(format!("{:#}", e)))?;

        let subgraph = normalize(rows, strategy.name(), strategy.max_depth());

        info!(
            requested = %selection.requested,
            strategy = %subgraph.strategy,
            fell_back = selection.fell_back(),
            nodes = subgraph.node_count(),
            relationships = subgraph.relationship_count(),
            hop_depth = subgraph.hop_depth,
            "Traversal complete"
        );

        Ok(subgraph)
    }
}
