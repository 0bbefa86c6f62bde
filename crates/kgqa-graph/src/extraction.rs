//! Query-time entry node extraction.
//!
//! Finds the graph nodes a question talks about:
//!
//! 1. Tokenize and drop stop-words.
//! 2. Build trigram, bigram and unigram candidates, longest first, so
//!    multi-word names ("stomach bleeding") win over their parts.
//! 3. Per candidate try an exact case-insensitive match on the search
//!    properties, then a `CONTAINS` match, then a fuzzy edit-distance match.
//! 4. Deduplicate by node id in discovery order.
//!
//! Every lookup confirms the node exists in the graph, so traversal never
//! starts from a made-up entity.

use std::collections::HashSet;

use tracing::{debug, info};

use kgqa_core::config::ExtractionConfig;
use kgqa_core::model::UNKNOWN_LABEL;
use kgqa_core::{EntryNode, KgqaError, KgqaResult};

use crate::store::{CypherQuery, GraphStore, NodeRow};

/// Words that are almost never entity names.
const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "do", "does", "did", "will", "would", "could",
    "should", "may", "might", "shall", "can", "need", "dare", "ought",
    "used", "to", "of", "in", "on", "at", "by", "for", "with", "about",
    "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "from", "up", "down", "out", "off", "over", "under",
    "again", "further", "then", "once", "and", "but", "or", "nor", "so",
    "yet", "both", "either", "neither", "not", "only", "own", "same",
    "than", "too", "very", "just", "because", "as", "until", "while",
    "if", "when", "where", "how", "what", "which", "who", "whom", "that",
    "this", "these", "those", "i", "me", "my", "myself", "we", "our",
    "you", "your", "he", "him", "his", "she", "her", "it", "its", "they",
    "them", "their", "tell", "give", "show", "find", "get", "let",
    "make", "know", "see", "take", "come", "go", "say", "ask",
];

const EXACT_LIMIT: i64 = 10;
const FUZZY_CANDIDATE_LIMIT: i64 = 200;
const FUZZY_TOP_N: usize = 5;
/// Fuzzy matching is skipped for candidates this short or shorter.
const FUZZY_MIN_CHARS: usize = 3;

/// Extracts graph entry nodes from natural-language questions.
pub struct EntityExtractor<S> {
    store: S,
    search_properties: Vec<String>,
    node_labels: Vec<String>,
    stop_words: HashSet<String>,
    fuzzy_threshold: f64,
}

impl<S: GraphStore> EntityExtractor<S> {
    pub fn new(store: S, config: &ExtractionConfig) -> Self {
        let mut search_properties: Vec<String> = config
            .search_properties
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if search_properties.is_empty() {
            search_properties.push("name".to_string());
        }

        let stop_words = DEFAULT_STOP_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(config.stop_words.iter().map(|w| w.to_lowercase()))
            .collect();

        Self {
            store,
            search_properties,
            node_labels: config.node_labels.clone(),
            stop_words,
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }

    /// Find entry nodes for a query, ordered by discovery (longest phrases first).
    pub async fn extract(&self, query: &str) -> KgqaResult<Vec<EntryNode>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.candidates(query);
        debug!(?candidates, "Extracted keyword candidates");

        let mut seen = HashSet::new();
        let mut entry_nodes = Vec::new();
        for candidate in &candidates {
            for node in self.find_in_graph(candidate).await? {
                if seen.insert(node.id.clone()) {
                    entry_nodes.push(node);
                }
            }
        }

        if entry_nodes.is_empty() {
            info!(query, "No entry nodes found");
        } else {
            let names: Vec<&str> = entry_nodes.iter().map(|n| n.name.as_str()).collect();
            info!(count = entry_nodes.len(), ?names, "Entry nodes found");
        }

        Ok(entry_nodes)
    }

    /// Candidate phrases: trigrams, then bigrams, then unigrams, deduplicated.
    pub fn candidates(&self, query: &str) -> Vec<String> {
        let cleaned: String = query
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c.is_whitespace() { c } else { ' ' })
            .collect();
        let tokens: Vec<String> = cleaned.to_lowercase().split_whitespace().map(str::to_string).collect();

        let content: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !self.stop_words.contains(*t))
            .collect();
        let content = if content.is_empty() {
            tokens.iter().map(String::as_str).collect()
        } else {
            content
        };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for n in [3usize, 2, 1] {
            for window in content.windows(n) {
                let phrase = window.join(" ");
                if seen.insert(phrase.clone()) {
                    candidates.push(phrase);
                }
            }
        }
        candidates
    }

    async fn find_in_graph(&self, keyword: &str) -> KgqaResult<Vec<EntryNode>> {
        let exact = self.lookup(self.match_query("=", keyword)).await?;
        if !exact.is_empty() {
            debug!(keyword, count = exact.len(), "Exact match");
            return Ok(exact.into_iter().map(to_entry_node).collect());
        }

        let partial = self.lookup(self.match_query("CONTAINS", keyword)).await?;
        if !partial.is_empty() {
            debug!(keyword, count = partial.len(), "Partial match");
            return Ok(partial.into_iter().map(to_entry_node).collect());
        }

        if keyword.chars().count() > FUZZY_MIN_CHARS {
            let fuzzy = self.fuzzy_match(keyword).await?;
            if !fuzzy.is_empty() {
                debug!(keyword, count = fuzzy.len(), "Fuzzy match");
            }
            return Ok(fuzzy);
        }

        Ok(Vec::new())
    }

    async fn lookup(&self, query: CypherQuery) -> KgqaResult<Vec<NodeRow>> {
        self.store
            .fetch_nodes(&query)
            .await
            .map_err(|e| KgqaError::store_unavailable(format!("{:#}", e)))
    }

    /// Exact (`=`) or partial (`CONTAINS`) match on any search property.
    fn match_query(&self, operator: &str, keyword: &str) -> CypherQuery {
        let conditions: Vec<String> = (0..self.search_properties.len())
            .map(|i| format!("toLower(n[$prop_{i}]) {operator} $keyword"))
            .collect();

        let text = format!(
            "MATCH (n)
WHERE ({}){}
RETURN elementId(n) AS id, labels(n)[0] AS label, properties(n) AS properties
LIMIT $limit",
            conditions.join(" OR "),
            self.label_condition()
        );

        self.bind_common(CypherQuery::new(text))
            .param_str("keyword", keyword.to_lowercase())
            .param_int("limit", EXACT_LIMIT)
    }

    /// Score length-prefiltered candidates locally by edit similarity.
    async fn fuzzy_match(&self, keyword: &str) -> KgqaResult<Vec<EntryNode>> {
        let kw_len = keyword.chars().count();
        let min_len = (kw_len - kw_len / 2).max(1);
        let max_len = kw_len + kw_len / 2;

        let text = format!(
            "MATCH (n)
WHERE size(toLower(n[$prop_0])) >= $min_len
  AND size(toLower(n[$prop_0])) <= $max_len{}
RETURN elementId(n) AS id, labels(n)[0] AS label, properties(n) AS properties,
       toLower(n[$prop_0]) AS candidate_name
LIMIT $limit",
            self.label_condition()
        );

        let query = self
            .bind_common(CypherQuery::new(text))
            .param_int("min_len", min_len as i64)
            .param_int("max_len", max_len as i64)
            .param_int("limit", FUZZY_CANDIDATE_LIMIT);

        let keyword = keyword.to_lowercase();
        let mut scored: Vec<(f64, NodeRow)> = self
            .lookup(query)
            .await?
            .into_iter()
            .filter_map(|row| {
                let name = row.candidate_name.as_deref().filter(|n| !n.is_empty())?;
                let score = similarity(&keyword, name);
                (score >= self.fuzzy_threshold).then_some((score, row))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(FUZZY_TOP_N)
            .map(|(_, row)| to_entry_node(row))
            .collect())
    }

    fn label_condition(&self) -> &'static str {
        if self.node_labels.is_empty() {
            ""
        } else {
            "\n  AND any(l IN labels(n) WHERE l IN $labels)"
        }
    }

    /// Bind search property names and label restriction.
    fn bind_common(&self, query: CypherQuery) -> CypherQuery {
        let query = self
            .search_properties
            .iter()
            .enumerate()
            .fold(query, |q, (i, prop)| q.param_str(&format!("prop_{i}"), prop.as_str()));

        if self.node_labels.is_empty() {
            query
        } else {
            query.param_list("labels", self.node_labels.clone())
        }
    }
}

fn to_entry_node(row: NodeRow) -> EntryNode {
    let name = row
        .properties
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    EntryNode {
        id: row.id,
        label: row.label.filter(|l| !l.is_empty()).unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        name,
        properties: row.properties,
    }
}

/// Indel similarity in `0.0..=1.0`: `(|a| + |b| - indel) / (|a| + |b|)`,
/// where the indel distance counts insertions and deletions only.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // Longest common subsequence; indel distance is `total - 2 * lcs`.
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let indel = total - 2 * prev[b.len()];

    (total - indel) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::QueryParam;
    use crate::traversal::engine::tests::MockStore;
    use kgqa_core::model::Properties;

    fn node_row(id: &str, label: &str, name: &str) -> NodeRow {
        let mut properties = Properties::new();
        properties.insert("name".to_string(), serde_json::json!(name));
        NodeRow {
            id: id.to_string(),
            label: Some(label.to_string()),
            properties,
            candidate_name: Some(name.to_lowercase()),
        }
    }

    fn extractor(store: MockStore) -> EntityExtractor<MockStore> {
        EntityExtractor::new(store, &ExtractionConfig::default())
    }

    #[test]
    fn test_candidates_longest_first() {
        let ex = extractor(MockStore::default());
        let candidates = ex.candidates("What causes stomach bleeding?");

        assert_eq!(candidates[0], "causes stomach bleeding");
        assert!(candidates.iter().position(|c| c == "stomach bleeding").unwrap()
            < candidates.iter().position(|c| c == "stomach").unwrap());
        assert!(!candidates.iter().any(|c| c == "what"));
    }

    #[test]
    fn test_candidates_keep_hyphens_and_numbers() {
        let ex = extractor(MockStore::default());
        let candidates = ex.candidates("Is co-codamol 500 safe?");
        assert!(candidates.contains(&"co-codamol".to_string()));
        assert!(candidates.contains(&"500".to_string()));
    }

    #[test]
    fn test_all_stop_words_falls_back_to_tokens() {
        let ex = extractor(MockStore::default());
        let candidates = ex.candidates("what is it");
        assert!(candidates.contains(&"what".to_string()));
    }

    #[test]
    fn test_configured_stop_words() {
        let config = ExtractionConfig {
            stop_words: vec!["Drug".to_string()],
            ..Default::default()
        };
        let ex = EntityExtractor::new(MockStore::default(), &config);
        assert_eq!(ex.candidates("drug aspirin"), vec!["aspirin".to_string()]);
    }

    #[test]
    fn test_similarity_forgives_dropped_letters() {
        let score = similarity("paracetml", "paracetamol");
        assert!((score - 0.9).abs() < 1e-9, "score was {}", score);
        assert!(score >= 0.85);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("aspirin", "aspirin"), 1.0);
        assert!(similarity("asprin", "aspirin") >= 0.85);
        assert!(similarity("aspirin", "warfarin") < 0.85);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[tokio::test]
    async fn test_extract_dedups_and_binds_keyword() {
        let store = MockStore {
            nodes: vec![node_row("n1", "Drug", "Aspirin")],
            ..Default::default()
        };
        let ex = extractor(store);
        let nodes = ex.extract("aspirin side effects").await.unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "Aspirin");
        assert_eq!(nodes[0].label, "Drug");

        let query = ex.store.last_query();
        assert!(query.text.contains("toLower(n[$prop_0]) = $keyword"));
        assert_eq!(query.param("prop_0"), Some(&QueryParam::Str("name".to_string())));
        assert!(matches!(query.param("keyword"), Some(QueryParam::Str(_))));
    }

    #[tokio::test]
    async fn test_empty_query_sends_nothing() {
        let ex = extractor(MockStore::default());
        assert!(ex.extract("   ").await.unwrap().is_empty());
        assert_eq!(ex.store.query_count(), 0);
    }

    #[tokio::test]
    async fn test_label_restriction_is_parameterized() {
        let config = ExtractionConfig {
            node_labels: vec!["Drug".to_string()],
            ..Default::default()
        };
        let ex = EntityExtractor::new(MockStore::default(), &config);
        ex.extract("aspirin").await.unwrap();

        let query = ex.store.last_query();
        assert!(query.text.contains("l IN $labels"));
        assert_eq!(query.param("labels"), Some(&QueryParam::StrList(vec!["Drug".to_string()])));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let store = MockStore {
            fail: true,
            ..Default::default()
        };
        let err = extractor(store).extract("aspirin").await.unwrap_err();
        assert!(matches!(err, KgqaError::StoreUnavailable(_)));
    }
}
