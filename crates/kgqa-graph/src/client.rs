//! Neo4j connection client.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::store::{CypherQuery, EdgeRow, GraphStore, NodeRow, QueryParam};
use kgqa_core::model::Properties;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
            max_connections: 8,
        }
    }
}

/// Client for Neo4j Knowledge Graph read operations.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// Note: neo4rs uses a lazy pool, so `Graph::connect` only creates the pool
    /// object and does NOT establish a real bolt connection yet.  We run a cheap
    /// `RETURN 1` ping immediately so that callers can wrap this in a timeout and
    /// get a fast failure when Neo4j is unreachable instead of hanging silently.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(200)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .context("Neo4j is not responding to queries")?;

        Ok(Self { graph })
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self
            .graph
            .execute(query)
            .await
            .context("Neo4j query failed")?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await.context("Failed to stream Neo4j rows")? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: Query, field: &str) -> Result<Option<T>> {
        let rows = self.query(query).await?;
        if let Some(row) = rows.into_iter().next() {
            let val: T = row
                .get(field)
                .map_err(|e| anyhow::anyhow!("Failed to get field '{}': {:?}", field, e))?;
            Ok(Some(val))
        } else {
            Ok(None)
        }
    }

    /// Get node and relationship counts for status display.
    pub async fn get_counts(&self) -> Result<GraphCounts> {
        let node_query = Query::new("MATCH (n) RETURN count(n) as count".to_string());
        let rel_query = Query::new("MATCH ()-[r]->() RETURN count(r) as count".to_string());

        let node_count: i64 = self.query_scalar(node_query, "count").await?.unwrap_or(0);
        let rel_count: i64 = self.query_scalar(rel_query, "count").await?.unwrap_or(0);

        Ok(GraphCounts {
            nodes: node_count as usize,
            relationships: rel_count as usize,
        })
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// Convert a store-independent query into a neo4rs query with bound parameters.
fn to_neo4j_query(query: &CypherQuery) -> Query {
    query
        .params
        .iter()
        .fold(Query::new(query.text.clone()), |q, (key, value)| match value {
            QueryParam::Str(s) => q.param(key, s.as_str()),
            QueryParam::StrList(list) => q.param(key, list.clone()),
            QueryParam::Int(i) => q.param(key, *i),
        })
}

fn props(row: &neo4rs::Row, field: &str) -> Properties {
    row.get::<BTreeMap<String, serde_json::Value>>(field)
        .unwrap_or_default()
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn fetch_edges(&self, query: &CypherQuery) -> Result<Vec<EdgeRow>> {
        let rows = self.query(to_neo4j_query(query)).await?;
        debug!(rows = rows.len(), "Traversal rows fetched");

        Ok(rows
            .iter()
            .map(|row| EdgeRow {
                source_id: row.get("source_id").ok(),
                source_label: row.get("source_label").ok(),
                source_props: props(row, "source_props"),
                rel_type: row.get("rel_type").ok(),
                rel_props: props(row, "rel_props"),
                target_id: row.get("target_id").ok(),
                target_label: row.get("target_label").ok(),
                target_props: props(row, "target_props"),
                path_length: row.get("path_length").ok(),
            })
            .collect())
    }

    async fn fetch_nodes(&self, query: &CypherQuery) -> Result<Vec<NodeRow>> {
        let rows = self.query(to_neo4j_query(query)).await?;

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id").unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            nodes.push(NodeRow {
                id,
                label: row.get("label").ok(),
                properties: props(&row, "properties"),
                candidate_name: row.get("candidate_name").ok(),
            });
        }
        Ok(nodes)
    }
}
