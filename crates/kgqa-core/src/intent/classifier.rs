//! Keyword-based intent classification.
//!
//! Deterministic: intents are checked in configuration order and the first
//! one with a keyword contained in the query wins.

use tracing::debug;

use crate::config::{DomainConfig, GENERAL_INTENT};

/// Maps query text to a configured intent name.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    patterns: Vec<(String, Vec<String>)>,
}

impl IntentClassifier {
    pub fn new(config: &DomainConfig) -> Self {
        let patterns = config
            .intents
            .iter()
            .map(|intent| {
                let keywords = intent
                    .definition
                    .keywords
                    .iter()
                    .map(|kw| kw.trim().to_lowercase())
                    .filter(|kw| !kw.is_empty())
                    .collect();
                (intent.name.clone(), keywords)
            })
            .collect();

        Self { patterns }
    }

    /// Return the first matching intent name, or `GENERAL_INTENT`.
    pub fn classify(&self, query: &str) -> &str {
        let q = query.to_lowercase();
        for (intent, keywords) in &self.patterns {
            if let Some(kw) = keywords.iter().find(|kw| q.contains(kw.as_str())) {
                debug!(intent = %intent, keyword = %kw, "Intent matched");
                return intent;
            }
        }
        GENERAL_INTENT
    }

    /// All configured intent names, excluding the general fallback.
    pub fn all_intents(&self) -> Vec<&str> {
        self.patterns.iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        let config = DomainConfig::from_json_str(include_str!("../../../../config/medical_graph.json"))
            .unwrap();
        IntentClassifier::new(&config)
    }

    #[test]
    fn test_multi_hop_intents() {
        let clf = classifier();
        assert_eq!(clf.classify("What symptoms does aspirin indirectly cause?"), "indirect_symptoms");
        assert_eq!(clf.classify("Give me an overview of metformin"), "neighborhood");
        assert_eq!(clf.classify("How is aspirin connected to kidney damage?"), "connection");
        assert_eq!(clf.classify("What side effects do aspirin and ibuprofen share?"), "shared_effects");
        assert_eq!(clf.classify("What does aspirin lead to?"), "drug_risk_chain");
    }

    #[test]
    fn test_targeted_intents() {
        let clf = classifier();
        assert_eq!(clf.classify("What are the side effects of Aspirin?"), "side_effects");
        assert_eq!(clf.classify("What treats headache?"), "treated_by");
        assert_eq!(clf.classify("What does ibuprofen treat?"), "treatment");
        assert_eq!(clf.classify("Can I take aspirin with warfarin?"), "interactions");
        assert_eq!(clf.classify("Does warfarin INTERACT with aspirin?"), "interactions");
    }

    #[test]
    fn test_no_match_is_general() {
        let clf = classifier();
        assert_eq!(clf.classify("Aspirin"), GENERAL_INTENT);
        assert_eq!(clf.classify(""), GENERAL_INTENT);
    }

    #[test]
    fn test_all_intents_listed_in_order() {
        let clf = classifier();
        let intents = clf.all_intents();
        assert_eq!(intents.first(), Some(&"shared_effects"));
        for name in ["indirect_symptoms", "drug_risk_chain", "neighborhood", "connection", "shared_effects"] {
            assert!(intents.contains(&name), "intent '{}' missing", name);
        }
        assert!(!intents.contains(&GENERAL_INTENT));
    }
}
