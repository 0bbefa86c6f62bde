//! Cypher construction for each traversal strategy.
//!
//! All strategies return rows of the same shape (see `EDGE_RETURN`), so the
//! normalizer never needs to know which query ran. Entry ids, relationship
//! types and labels are always bound parameters; the only literals in the
//! text are hop bounds, which Cypher cannot parameterize and which have
//! already been clamped by strategy resolution.

use kgqa_core::intent::model::{
    EntryAnchor, HopSpec, TraversalStrategy, MAX_SHORTEST_PATH_HOPS, MAX_VARIABLE_HOPS,
};
use kgqa_core::model::EntryNode;

use crate::store::CypherQuery;

/// Unwind a path variable named `path` into one row per relationship,
/// keeping the stored edge direction.
const PATH_UNWIND: &str = "
UNWIND range(0, length(path) - 1) AS i
WITH path, relationships(path)[i] AS r
WITH path, r, startNode(r) AS src, endNode(r) AS tgt";

/// Shared row shape. `{path_length}` is the expression reporting how deep
/// the edge's path was.
const EDGE_RETURN: &str = "
RETURN DISTINCT
    elementId(src)  AS source_id,
    labels(src)[0]  AS source_label,
    properties(src) AS source_props,
    type(r)         AS rel_type,
    properties(r)   AS rel_props,
    elementId(tgt)  AS target_id,
    labels(tgt)[0]  AS target_label,
    properties(tgt) AS target_props,
    {path_length}   AS path_length";

fn edge_return(path_length: &str) -> String {
    EDGE_RETURN.replace("{path_length}", path_length)
}

/// Build the query for a resolved strategy.
///
/// `entry_nodes` must already satisfy the strategy's cardinality (see
/// `select_strategy`); `limit` bounds rows or paths depending on the shape.
pub fn synthesize(strategy: &TraversalStrategy, entry_nodes: &[EntryNode], limit: u32) -> CypherQuery {
    let first_id = entry_nodes.first().map(|n| n.id.clone()).unwrap_or_default();

    let query = match strategy {
        TraversalStrategy::Targeted {
            relationship,
            anchor,
            source_label,
            target_label,
        } => targeted(&first_id, relationship, *anchor, source_label.as_deref(), target_label.as_deref()),
        TraversalStrategy::Chained { hops, entry_label } => {
            chained(&first_id, hops, entry_label.as_deref())
        }
        TraversalStrategy::VariableHop { min_hops, max_hops } => {
            variable_hop(&first_id, *min_hops, *max_hops)
        }
        TraversalStrategy::ShortestPath { max_hops } => {
            let second_id = entry_nodes.get(1).map(|n| n.id.clone()).unwrap_or_default();
            shortest_path(&first_id, &second_id, *max_hops)
        }
        TraversalStrategy::SharedNeighbor { min_connections } => {
            shared_neighbor(entry_nodes, *min_connections)
        }
    };

    query.param_int("limit", i64::from(limit.max(1)))
}

fn targeted(
    entry_id: &str,
    relationship: &str,
    anchor: EntryAnchor,
    source_label: Option<&str>,
    target_label: Option<&str>,
) -> CypherQuery {
    let anchor_clause = match anchor {
        EntryAnchor::Source => "elementId(src) = $entry_id",
        EntryAnchor::Target => "elementId(tgt) = $entry_id",
        EntryAnchor::Either => "(elementId(src) = $entry_id OR elementId(tgt) = $entry_id)",
    };

    let mut conditions = vec![anchor_clause.to_string(), "type(r) = $rel_type".to_string()];
    if source_label.is_some() {
        conditions.push("$source_label IN labels(src)".to_string());
    }
    if target_label.is_some() {
        conditions.push("$target_label IN labels(tgt)".to_string());
    }

    let text = format!(
        "MATCH (src)-[r]->(tgt)\nWHERE {}{}\nLIMIT $limit",
        conditions.join("\n  AND "),
        edge_return("1")
    );

    let mut query = CypherQuery::new(text)
        .param_str("entry_id", entry_id)
        .param_str("rel_type", relationship);
    if let Some(label) = source_label {
        query = query.param_str("source_label", label);
    }
    if let Some(label) = target_label {
        query = query.param_str("target_label", label);
    }
    query
}

fn chained(entry_id: &str, hops: &[HopSpec], entry_label: Option<&str>) -> CypherQuery {
    // (n0)-[r1]->(n1)-[r2]->(n2)...
    let mut pattern = String::from("(n0)");
    let mut conditions = vec!["elementId(n0) = $entry_id".to_string()];
    let mut query_params = Vec::new();

    if let Some(label) = entry_label {
        conditions.push("$entry_label IN labels(n0)".to_string());
        query_params.push(("entry_label".to_string(), label.to_string()));
    }

    for (i, hop) in hops.iter().enumerate() {
        let step = i + 1;
        pattern.push_str(&format!("-[r{step}]->(n{step})"));

        conditions.push(format!("type(r{step}) = $rel_{step}"));
        query_params.push((format!("rel_{step}"), hop.relationship.clone()));

        if let Some(label) = hop.target_label.as_deref().filter(|l| !l.is_empty()) {
            conditions.push(format!("$label_{step} IN labels(n{step})"));
            query_params.push((format!("label_{step}"), label.to_string()));
        }
    }

    let text = format!(
        "MATCH path = {}\nWHERE {}\nWITH path LIMIT $limit{}{}",
        pattern,
        conditions.join("\n  AND "),
        PATH_UNWIND,
        edge_return("length(path)")
    );

    query_params
        .into_iter()
        .fold(CypherQuery::new(text).param_str("entry_id", entry_id), |q, (k, v)| {
            q.param_str(&k, v)
        })
}

fn variable_hop(entry_id: &str, min_hops: u32, max_hops: u32) -> CypherQuery {
    let max_hops = max_hops.clamp(1, MAX_VARIABLE_HOPS);
    let min_hops = min_hops.clamp(1, max_hops);

    let text = format!(
        "MATCH path = (source)-[*{min_hops}..{max_hops}]-(target)
WHERE elementId(source) = $entry_id AND source <> target
WITH path LIMIT $limit{}{}",
        PATH_UNWIND,
        edge_return("length(path)")
    );

    CypherQuery::new(text).param_str("entry_id", entry_id)
}

fn shortest_path(source_id: &str, target_id: &str, max_hops: u32) -> CypherQuery {
    let max_hops = max_hops.clamp(1, MAX_SHORTEST_PATH_HOPS);

    let text = format!(
        "MATCH (a), (b)
WHERE elementId(a) = $source_id AND elementId(b) = $target_id
MATCH path = shortestPath((a)-[*..{max_hops}]-(b))
WITH path LIMIT $limit{}{}",
        PATH_UNWIND,
        edge_return("length(path)")
    );

    CypherQuery::new(text)
        .param_str("source_id", source_id)
        .param_str("target_id", target_id)
}

fn shared_neighbor(entry_nodes: &[EntryNode], min_connections: Option<u32>) -> CypherQuery {
    let entry_count = entry_nodes.len().max(1) as u32;
    let min_conn = min_connections.unwrap_or(entry_count).clamp(1, entry_count);
    let ids: Vec<String> = entry_nodes.iter().map(|n| n.id.clone()).collect();

    let text = format!(
        "MATCH (entry)--(neighbor)
WHERE elementId(entry) IN $ids
WITH neighbor, count(DISTINCT entry) AS connected_entries
WHERE connected_entries >= $min_conn
MATCH (entry)-[r]-(neighbor)
WHERE elementId(entry) IN $ids
WITH r, startNode(r) AS src, endNode(r) AS tgt{}
LIMIT $limit",
        edge_return("1")
    );

    CypherQuery::new(text)
        .param_list("ids", ids)
        .param_int("min_conn", i64::from(min_conn))
}
