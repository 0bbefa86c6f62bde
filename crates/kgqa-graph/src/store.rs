//! The seam between query construction and query execution.
//!
//! Everything above this module builds `CypherQuery` values and consumes
//! typed rows; only `GraphStore` implementations talk to a database.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use kgqa_core::model::Properties;

/// A bound query parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryParam {
    Str(String),
    StrList(Vec<String>),
    Int(i64),
}

/// Cypher text plus its bound parameters.
///
/// Values that come from users or configuration are never spliced into
/// `text`; they travel in `params`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CypherQuery {
    pub text: String,
    pub params: Vec<(String, QueryParam)>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn param_str(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), QueryParam::Str(value.into())));
        self
    }

    pub fn param_list(mut self, key: &str, values: Vec<String>) -> Self {
        self.params.push((key.to_string(), QueryParam::StrList(values)));
        self
    }

    pub fn param_int(mut self, key: &str, value: i64) -> Self {
        self.params.push((key.to_string(), QueryParam::Int(value)));
        self
    }

    pub fn param(&self, key: &str) -> Option<&QueryParam> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// One edge as returned by a traversal query.
///
/// Every strategy's query yields rows of this shape; fields are optional
/// because the store may legitimately return nulls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeRow {
    pub source_id: Option<String>,
    pub source_label: Option<String>,
    pub source_props: Properties,
    pub rel_type: Option<String>,
    pub rel_props: Properties,
    pub target_id: Option<String>,
    pub target_label: Option<String>,
    pub target_props: Properties,
    /// Length of the path this edge was taken from.
    pub path_length: Option<i64>,
}

/// One node as returned by an entry-node lookup query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRow {
    pub id: String,
    pub label: Option<String>,
    pub properties: Properties,
    /// Lowercased search property, present on fuzzy candidate queries.
    pub candidate_name: Option<String>,
}

/// A graph store able to run read queries.
///
/// Implementations must be safe to share between concurrent queries.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a traversal query and return its edge rows.
    async fn fetch_edges(&self, query: &CypherQuery) -> Result<Vec<EdgeRow>>;

    /// Run a node lookup query and return its node rows.
    async fn fetch_nodes(&self, query: &CypherQuery) -> Result<Vec<NodeRow>>;
}

#[async_trait]
impl<T: GraphStore + ?Sized> GraphStore for Arc<T> {
    async fn fetch_edges(&self, query: &CypherQuery) -> Result<Vec<EdgeRow>> {
        (**self).fetch_edges(query).await
    }

    async fn fetch_nodes(&self, query: &CypherQuery) -> Result<Vec<NodeRow>> {
        (**self).fetch_nodes(query).await
    }
}
