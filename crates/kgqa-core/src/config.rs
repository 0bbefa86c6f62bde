//! Domain configuration document.
//!
//! A single JSON file describes the intents (keywords + traversal strategy),
//! the relationship sentence templates, extraction settings and row limits.
//! It is loaded once, validated eagerly and then shared read-only.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{KgqaError, KgqaResult};
use crate::intent::model::{IntentDefinition, StrategyKind};

/// Name reported for queries that match no configured intent.
pub const GENERAL_INTENT: &str = "general";

/// An intent entry, in the order it appears in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedIntent {
    pub name: String,
    #[serde(flatten)]
    pub definition: IntentDefinition,
}

/// Settings for the fallback 1-hop traversal used when no intent matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralTraversal {
    #[serde(default = "default_general_limit")]
    pub node_limit: u32,
}

fn default_general_limit() -> u32 {
    30
}

impl Default for GeneralTraversal {
    fn default() -> Self {
        Self {
            node_limit: default_general_limit(),
        }
    }
}

/// Upper bounds on rows (or paths) a single traversal query may return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalLimits {
    pub targeted: u32,
    pub chained: u32,
    pub variable_hop: u32,
    pub shortest_path: u32,
    pub shared_neighbor: u32,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            targeted: 50,
            chained: 100,
            variable_hop: 60,
            shortest_path: 20,
            shared_neighbor: 100,
        }
    }
}

impl TraversalLimits {
    pub fn for_strategy(&self, kind: StrategyKind) -> u32 {
        match kind {
            StrategyKind::Targeted => self.targeted,
            StrategyKind::Chained => self.chained,
            StrategyKind::VariableHop => self.variable_hop,
            StrategyKind::ShortestPath => self.shortest_path,
            StrategyKind::SharedNeighbor => self.shared_neighbor,
        }
    }
}

/// How entry nodes are looked up from query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Node properties compared against query phrases.
    pub search_properties: Vec<String>,
    /// Restrict lookups to these labels; empty means any label.
    pub node_labels: Vec<String>,
    /// Extra domain words that never name an entity.
    pub stop_words: Vec<String>,
    /// Minimum normalized edit similarity for a fuzzy match.
    pub fuzzy_threshold: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            search_properties: vec!["name".to_string()],
            node_labels: Vec::new(),
            stop_words: Vec::new(),
            fuzzy_threshold: 0.85,
        }
    }
}

/// The whole configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default)]
    pub intents: Vec<NamedIntent>,
    #[serde(default)]
    pub relationship_templates: HashMap<String, String>,
    #[serde(default)]
    pub general_traversal: GeneralTraversal,
    #[serde(default)]
    pub limits: TraversalLimits,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl DomainConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> KgqaResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            intents = config.intents.len(),
            templates = config.relationship_templates.len(),
            "Domain config loaded"
        );
        Ok(config)
    }

    /// Parse and validate a configuration document.
    pub fn from_json_str(raw: &str) -> KgqaResult<Self> {
        let config: DomainConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve every intent so a bad definition fails at load, not mid-query.
    pub fn validate(&self) -> KgqaResult<()> {
        let mut seen = HashSet::new();
        for intent in &self.intents {
            if intent.name.trim().is_empty() {
                return Err(KgqaError::configuration("intent with an empty name"));
            }
            if intent.name == GENERAL_INTENT {
                return Err(KgqaError::configuration(format!(
                    "intent name '{}' is reserved",
                    GENERAL_INTENT
                )));
            }
            if !seen.insert(intent.name.as_str()) {
                return Err(KgqaError::configuration(format!(
                    "duplicate intent '{}'",
                    intent.name
                )));
            }
            intent.definition.resolve().map_err(|e| match e {
                KgqaError::Configuration(msg) => {
                    KgqaError::configuration(format!("intent '{}': {}", intent.name, msg))
                }
                other => other,
            })?;
        }

        if !(0.0..=1.0).contains(&self.extraction.fuzzy_threshold) {
            return Err(KgqaError::configuration(format!(
                "fuzzy_threshold must be within 0..=1, got {}",
                self.extraction.fuzzy_threshold
            )));
        }
        Ok(())
    }

    pub fn intent(&self, name: &str) -> Option<&IntentDefinition> {
        self.intents
            .iter()
            .find(|i| i.name == name)
            .map(|i| &i.definition)
    }

    pub fn intent_names(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|i| i.name.as_str())
    }

    /// Undirected single-hop exploration used when no intent matches.
    pub fn general_intent(&self) -> IntentDefinition {
        let mut intent = IntentDefinition::new(StrategyKind::VariableHop.as_str());
        intent.min_hops = Some(1);
        intent.max_hops = Some(1);
        intent
    }
}
