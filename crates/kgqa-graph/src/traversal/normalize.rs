//! Collapse raw traversal rows into a canonical `Subgraph`.

use std::collections::BTreeMap;

use kgqa_core::model::{
    Node, Properties, Relationship, RelationshipKey, Subgraph, DEFAULT_RELATIONSHIP_TYPE,
    UNKNOWN_LABEL,
};

use crate::store::EdgeRow;

/// Build a deduplicated subgraph from edge rows.
///
/// Nodes are keyed by id and relationships by `(source_id, target_id, type)`,
/// so anything touched by several paths is recorded once. `hop_depth` is the
/// deepest path actually observed, never more than `max_hop_depth`.
pub fn normalize(rows: Vec<EdgeRow>, strategy: &str, max_hop_depth: u32) -> Subgraph {
    let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
    let mut relationships: BTreeMap<RelationshipKey, Relationship> = BTreeMap::new();
    let mut hop_depth: u32 = 0;

    for row in rows {
        let source_id = upsert_node(&mut nodes, row.source_id, row.source_label, row.source_props);
        let target_id = upsert_node(&mut nodes, row.target_id, row.target_label, row.target_props);

        let (Some(source_id), Some(target_id)) = (source_id, target_id) else {
            continue;
        };

        let rel = Relationship {
            source_id,
            target_id,
            rel_type: row
                .rel_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_RELATIONSHIP_TYPE.to_string()),
            properties: row.rel_props,
        };
        relationships.entry(rel.key()).or_insert(rel);

        let depth = row
            .path_length
            .and_then(|len| u32::try_from(len).ok())
            .unwrap_or(1);
        hop_depth = hop_depth.max(depth);
    }

    Subgraph::from_parts(nodes, relationships, strategy, hop_depth.min(max_hop_depth))
}

/// Insert a node if it is not already known; returns its id when present.
fn upsert_node(
    nodes: &mut BTreeMap<String, Node>,
    id: Option<String>,
    label: Option<String>,
    properties: Properties,
) -> Option<String> {
    let id = id.filter(|id| !id.is_empty())?;

    nodes.entry(id.clone()).or_insert_with(|| {
        let name = properties
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Node {
            id: id.clone(),
            label: label
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            name,
            properties,
        }
    });

    Some(id)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a row the way every traversal query shapes it.
    pub(crate) fn edge_row(
        source: (&str, &str, &str),
        rel_type: &str,
        target: (&str, &str, &str),
        path_length: i64,
    ) -> EdgeRow {
        let props = |name: &str| {
            let mut p = Properties::new();
            p.insert("name".to_string(), serde_json::json!(name));
            p
        };
        EdgeRow {
            source_id: Some(source.0.to_string()),
            source_label: Some(source.1.to_string()),
            source_props: props(source.2),
            rel_type: Some(rel_type.to_string()),
            rel_props: Properties::new(),
            target_id: Some(target.0.to_string()),
            target_label: Some(target.1.to_string()),
            target_props: props(target.2),
            path_length: Some(path_length),
        }
    }

    const ASPIRIN: (&str, &str, &str) = ("n1", "Drug", "Aspirin");
    const NAUSEA: (&str, &str, &str) = ("n2", "SideEffect", "Nausea");
    const BLEEDING: (&str, &str, &str) = ("n3", "SideEffect", "Stomach Bleeding");

    #[test]
    fn test_zero_rows_is_empty_not_error() {
        let subgraph = normalize(Vec::new(), "chained", 2);
        assert!(subgraph.is_empty());
        assert_eq!(subgraph.relationship_count(), 0);
        assert_eq!(subgraph.hop_depth, 0);
        assert_eq!(subgraph.strategy, "chained");
    }

    #[test]
    fn test_overlapping_paths_are_deduplicated() {
        let rows = vec![
            edge_row(ASPIRIN, "CAUSES", NAUSEA, 1),
            edge_row(ASPIRIN, "CAUSES", NAUSEA, 2),
            edge_row(ASPIRIN, "CAUSES", BLEEDING, 2),
        ];
        let subgraph = normalize(rows, "variable_hop", 2);

        assert_eq!(subgraph.node_count(), 3);
        assert_eq!(subgraph.relationship_count(), 2);
        assert!(subgraph.contains_relationship("n1", "n2", "CAUSES"));
        assert!(subgraph.contains_relationship("n1", "n3", "CAUSES"));
    }

    #[test]
    fn test_hop_depth_is_observed_not_configured() {
        let rows = vec![edge_row(ASPIRIN, "CAUSES", NAUSEA, 1)];
        let subgraph = normalize(rows, "variable_hop", 2);
        assert_eq!(subgraph.hop_depth, 1);
    }

    #[test]
    fn test_hop_depth_never_exceeds_requested_maximum() {
        let rows = vec![edge_row(ASPIRIN, "CAUSES", NAUSEA, 5)];
        let subgraph = normalize(rows, "variable_hop", 2);
        assert_eq!(subgraph.hop_depth, 2);
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let forward = vec![
            edge_row(ASPIRIN, "CAUSES", NAUSEA, 1),
            edge_row(ASPIRIN, "CAUSES", BLEEDING, 1),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(normalize(forward, "targeted", 1), normalize(backward, "targeted", 1));
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let mut row = edge_row(ASPIRIN, "", NAUSEA, 1);
        row.target_label = None;
        row.target_props = Properties::new();
        let subgraph = normalize(vec![row], "targeted", 1);

        let target = subgraph.node("n2").unwrap();
        assert_eq!(target.label, UNKNOWN_LABEL);
        assert_eq!(target.name, "");
        assert!(subgraph.contains_relationship("n1", "n2", DEFAULT_RELATIONSHIP_TYPE));
    }

    #[test]
    fn test_half_row_keeps_node_without_edge() {
        let mut row = edge_row(ASPIRIN, "CAUSES", NAUSEA, 1);
        row.target_id = None;
        let subgraph = normalize(vec![row], "targeted", 1);

        assert_eq!(subgraph.node_count(), 1);
        assert_eq!(subgraph.relationship_count(), 0);
        assert_eq!(subgraph.hop_depth, 0);
    }
}
