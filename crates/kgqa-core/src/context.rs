//! Renders a subgraph as plain text for an LLM prompt.
//!
//! ```text
//! [Traversal: targeted, depth=1, 3 nodes, 2 edges]
//!
//! ENTITIES:
//!   - [Drug] Aspirin (type: NSAID)
//!   - [SideEffect] Nausea
//!
//! RELATIONSHIPS:
//!   - Aspirin may cause Nausea
//! ```

use std::collections::HashMap;

use crate::config::DomainConfig;
use crate::model::{Node, Subgraph};

/// Sentence shape for relationship types without a configured template.
pub const DEFAULT_TEMPLATE: &str = "{source} --{type}--> {target}";

pub const NO_INFORMATION: &str = "No relevant information found in the knowledge graph.";

/// Turns subgraphs into LLM-readable context.
#[derive(Debug, Clone, Default)]
pub struct ContextGenerator {
    templates: HashMap<String, String>,
}

impl ContextGenerator {
    pub fn new(config: &DomainConfig) -> Self {
        Self {
            templates: config.relationship_templates.clone(),
        }
    }

    pub fn generate(&self, subgraph: &Subgraph) -> String {
        if subgraph.is_empty() {
            return NO_INFORMATION.to_string();
        }

        let mut lines = Vec::new();
        if !subgraph.strategy.is_empty() {
            lines.push(format!(
                "[Traversal: {}, depth={}, {} nodes, {} edges]",
                subgraph.strategy,
                subgraph.hop_depth,
                subgraph.node_count(),
                subgraph.relationship_count()
            ));
            lines.push(String::new());
        }

        lines.push("ENTITIES:".to_string());
        lines.extend(subgraph.nodes().map(entity_line));

        if subgraph.relationship_count() > 0 {
            lines.push(String::new());
            lines.push("RELATIONSHIPS:".to_string());
            for rel in subgraph.relationships() {
                let template = self
                    .templates
                    .get(&rel.rel_type)
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_TEMPLATE);
                let sentence = template
                    .replace("{source}", subgraph.display_name(&rel.source_id))
                    .replace("{target}", subgraph.display_name(&rel.target_id))
                    .replace("{type}", &rel.rel_type);
                lines.push(format!("  - {}", sentence));
            }
        }

        lines.join("\n")
    }
}

fn entity_line(node: &Node) -> String {
    let name = if node.name.is_empty() { "(unnamed)" } else { node.name.as_str() };

    let extras: Vec<String> = node
        .properties
        .iter()
        .filter(|(key, _)| key.as_str() != "name")
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(format!("{}: {}", key, s)),
            other => Some(format!("{}: {}", key, other)),
        })
        .collect();

    if extras.is_empty() {
        format!("  - [{}] {}", node.label, name)
    } else {
        format!("  - [{}] {} ({})", node.label, name, extras.join(", "))
    }
}
