//! Graph value types shared by every stage of the pipeline.
//!
//! Entry nodes come in from extraction, `Subgraph` goes out to context
//! generation. All of them are query-scoped values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Scalar property bag of a node or relationship.
pub type Properties = BTreeMap<String, serde_json::Value>;

/// Label used when the store returns a node without one.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Type used when the store returns a relationship without one.
pub const DEFAULT_RELATIONSHIP_TYPE: &str = "RELATED_TO";

/// A graph node identified as relevant to the query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryNode {
    pub id: String,
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

impl EntryNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut properties = Properties::new();
        properties.insert("name".to_string(), serde_json::Value::String(name.clone()));
        Self {
            id: id.into(),
            label: label.into(),
            name,
            properties,
        }
    }
}

/// A node in a traversal result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
}

impl From<EntryNode> for Node {
    fn from(entry: EntryNode) -> Self {
        Self {
            id: entry.id,
            label: entry.label,
            name: entry.name,
            properties: entry.properties,
        }
    }
}

/// A directed, typed edge in a traversal result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Properties,
}

/// Identity of a relationship within a subgraph.
pub type RelationshipKey = (String, String, String);

impl Relationship {
    pub fn key(&self) -> RelationshipKey {
        (
            self.source_id.clone(),
            self.target_id.clone(),
            self.rel_type.clone(),
        )
    }
}

/// Canonical, deduplicated traversal result.
///
/// Nodes are keyed by id and relationships by `(source_id, target_id, type)`.
/// Both maps iterate in key order, so two subgraphs built from the same facts
/// compare equal regardless of the order the store returned rows in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    nodes: BTreeMap<String, Node>,
    #[serde(with = "relationship_list")]
    relationships: BTreeMap<RelationshipKey, Relationship>,
    pub strategy: String,
    pub hop_depth: u32,
}

impl Subgraph {
    /// An empty result: "no facts found" for the given strategy.
    pub fn empty(strategy: impl Into<String>) -> Self {
        Self {
            nodes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            strategy: strategy.into(),
            hop_depth: 0,
        }
    }

    /// Assemble a subgraph from already-deduplicated parts.
    ///
    /// Relationships whose endpoints are missing from `nodes` are dropped so
    /// the endpoint invariant always holds.
    pub fn from_parts(
        nodes: BTreeMap<String, Node>,
        relationships: BTreeMap<RelationshipKey, Relationship>,
        strategy: impl Into<String>,
        hop_depth: u32,
    ) -> Self {
        let relationships = relationships
            .into_iter()
            .filter(|(_, rel)| {
                nodes.contains_key(&rel.source_id) && nodes.contains_key(&rel.target_id)
            })
            .collect();

        Self {
            nodes,
            relationships,
            strategy: strategy.into(),
            hop_depth,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_relationship(&self, source_id: &str, target_id: &str, rel_type: &str) -> bool {
        self.relationships.contains_key(&(
            source_id.to_string(),
            target_id.to_string(),
            rel_type.to_string(),
        ))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Display name for a node id, falling back to its label, then the id.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        match self.nodes.get(id) {
            Some(node) if !node.name.is_empty() => &node.name,
            Some(node) => &node.label,
            None => id,
        }
    }
}

/// Serialize relationships as a plain list; tuple keys are not valid JSON keys.
mod relationship_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Relationship, RelationshipKey};

    pub fn serialize<S>(
        map: &BTreeMap<RelationshipKey, Relationship>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<RelationshipKey, Relationship>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<Relationship>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|rel| (rel.key(), rel)).collect())
    }
}
