//! Question answering pipeline: extract, classify, traverse, render, answer.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use kgqa_core::intent::IntentClassifier;
use kgqa_core::{ContextGenerator, DomainConfig, EntryNode, Subgraph};
use kgqa_graph::{EntityExtractor, GraphStore, TraversalEngine};
use kgqa_llm::OllamaClient;

/// Answer given when the question names nothing found in the graph.
pub const NO_ENTITIES_ANSWER: &str =
    "I could not find any of the entities in your question in the knowledge graph.";

/// Strategy name reported when no traversal ran.
pub const NO_TRAVERSAL: &str = "none";

/// Everything produced while answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineAnswer {
    pub question: String,
    pub intent: String,
    pub entry_nodes: Vec<EntryNode>,
    pub subgraph: Subgraph,
    pub context: String,
    /// `None` when answer generation is disabled.
    pub answer: Option<String>,
}

pub struct Pipeline<S> {
    extractor: EntityExtractor<S>,
    classifier: IntentClassifier,
    engine: TraversalEngine<S>,
    context: ContextGenerator,
    llm: Option<OllamaClient>,
}

impl<S: GraphStore + Clone> Pipeline<S> {
    pub fn new(store: S, config: Arc<DomainConfig>, llm: Option<OllamaClient>) -> Self {
        Self {
            extractor: EntityExtractor::new(store.clone(), &config.extraction),
            classifier: IntentClassifier::new(&config),
            context: ContextGenerator::new(&config),
            engine: TraversalEngine::new(store, config),
            llm,
        }
    }

    pub async fn ask(&self, question: &str) -> Result<PipelineAnswer> {
        let intent = self.classifier.classify(question).to_string();
        let entry_nodes = self
            .extractor
            .extract(question)
            .await
            .context("Entry node extraction failed")?;

        if entry_nodes.is_empty() {
            info!(intent = %intent, "No entry nodes, skipping traversal");
            let subgraph = Subgraph::empty(NO_TRAVERSAL);
            return Ok(PipelineAnswer {
                question: question.to_string(),
                intent,
                entry_nodes,
                context: self.context.generate(&subgraph),
                subgraph,
                answer: self.llm.as_ref().map(|_| NO_ENTITIES_ANSWER.to_string()),
            });
        }

        let subgraph = self
            .engine
            .traverse(&intent, &entry_nodes)
            .await
            .with_context(|| format!("Traversal for intent '{}' failed", intent))?;
        let context = self.context.generate(&subgraph);

        let answer = match &self.llm {
            Some(llm) => Some(
                llm.answer(question, &context)
                    .await
                    .with_context(|| format!("Answer generation with '{}' failed", llm.model()))?,
            ),
            None => None,
        };

        Ok(PipelineAnswer {
            question: question.to_string(),
            intent,
            entry_nodes,
            subgraph,
            context,
            answer,
        })
    }

    /// Resolve entity names to entry nodes, taking the best match per name.
    pub async fn resolve_entities(&self, names: &[String]) -> Result<Vec<EntryNode>> {
        let mut entry_nodes: Vec<EntryNode> = Vec::new();
        for name in names {
            let found = self
                .extractor
                .extract(name)
                .await
                .with_context(|| format!("Lookup of '{}' failed", name))?;
            match found.into_iter().find(|n| !entry_nodes.iter().any(|e| e.id == n.id)) {
                Some(node) => entry_nodes.push(node),
                None => warn!(entity = %name, "Entity not found in graph"),
            }
        }
        Ok(entry_nodes)
    }

    /// Traverse for a named intent from explicit entry nodes.
    pub async fn traverse(&self, intent: &str, entry_nodes: &[EntryNode]) -> Result<(Subgraph, String)> {
        let subgraph = self
            .engine
            .traverse(intent, entry_nodes)
            .await
            .with_context(|| format!("Traversal for intent '{}' failed", intent))?;
        let context = self.context.generate(&subgraph);
        Ok((subgraph, context))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use kgqa_core::context::NO_INFORMATION;
    use kgqa_graph::{CypherQuery, EdgeRow, NodeRow};
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct FakeStore {
        nodes: Vec<NodeRow>,
        edges: Vec<EdgeRow>,
        edge_queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GraphStore for FakeStore {
        async fn fetch_edges(&self, query: &CypherQuery) -> anyhow::Result<Vec<EdgeRow>> {
            self.edge_queries.lock().unwrap().push(query.text.clone());
            Ok(self.edges.clone())
        }

        async fn fetch_nodes(&self, _query: &CypherQuery) -> anyhow::Result<Vec<NodeRow>> {
            Ok(self.nodes.clone())
        }
    }

    fn config() -> Arc<DomainConfig> {
        Arc::new(
            DomainConfig::from_json_str(include_str!("../../../config/medical_graph.json")).unwrap(),
        )
    }

    fn node_row(id: &str, label: &str, name: &str) -> NodeRow {
        NodeRow {
            id: id.to_string(),
            label: Some(label.to_string()),
            properties: [("name".to_string(), json!(name))].into_iter().collect(),
            candidate_name: None,
        }
    }

    fn aspirin_causes_nausea() -> EdgeRow {
        EdgeRow {
            source_id: Some("d1".to_string()),
            source_label: Some("Drug".to_string()),
            source_props: [("name".to_string(), json!("Aspirin"))].into_iter().collect(),
            rel_type: Some("CAUSES".to_string()),
            target_id: Some("s1".to_string()),
            target_label: Some("SideEffect".to_string()),
            target_props: [("name".to_string(), json!("Nausea"))].into_iter().collect(),
            path_length: Some(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ask_without_llm_renders_context() {
        let store = Arc::new(FakeStore {
            nodes: vec![node_row("d1", "Drug", "Aspirin")],
            edges: vec![aspirin_causes_nausea()],
            ..Default::default()
        });
        let pipeline = Pipeline::new(store.clone(), config(), None);

        let result = pipeline.ask("What are the side effects of aspirin?").await.unwrap();

        assert_eq!(result.intent, "side_effects");
        assert_eq!(result.entry_nodes.len(), 1);
        assert_eq!(result.subgraph.strategy, "targeted");
        assert!(result.context.contains("Aspirin may cause Nausea"));
        assert!(result.answer.is_none());
        assert_eq!(store.edge_queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ask_short_circuits_without_entry_nodes() {
        let store = Arc::new(FakeStore::default());
        let pipeline = Pipeline::new(store.clone(), config(), None);

        let result = pipeline.ask("What are the side effects of unobtainium?").await.unwrap();

        assert!(result.entry_nodes.is_empty());
        assert!(result.subgraph.is_empty());
        assert_eq!(result.subgraph.strategy, NO_TRAVERSAL);
        assert_eq!(result.context, NO_INFORMATION);
        assert!(store.edge_queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ask_short_circuit_answers_when_llm_enabled() {
        let store = Arc::new(FakeStore::default());
        let llm = OllamaClient::new("http://127.0.0.1:9", "test-model");
        let pipeline = Pipeline::new(store, config(), Some(llm));

        let result = pipeline.ask("Tell me about unobtainium").await.unwrap();

        assert_eq!(result.answer.as_deref(), Some(NO_ENTITIES_ANSWER));
    }

    #[tokio::test]
    async fn test_resolve_entities_skips_duplicates() {
        let store = Arc::new(FakeStore {
            nodes: vec![node_row("d1", "Drug", "Aspirin")],
            ..Default::default()
        });
        let pipeline = Pipeline::new(store, config(), None);

        let names = vec!["aspirin".to_string(), "Aspirin".to_string()];
        let entry_nodes = pipeline.resolve_entities(&names).await.unwrap();

        assert_eq!(entry_nodes.len(), 1);
        assert_eq!(entry_nodes[0].name, "Aspirin");
    }

    #[tokio::test]
    async fn test_shared_neighbor_needs_two_entities() {
        let store = Arc::new(FakeStore::default());
        let pipeline = Pipeline::new(store, config(), None);

        let entry_nodes = vec![EntryNode::new("d1", "Drug", "Aspirin")];
        let err = pipeline.traverse("shared_effects", &entry_nodes).await.unwrap_err();

        assert!(format!("{:#}", err).contains("shared_effects"));
    }
}
