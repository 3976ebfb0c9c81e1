//! Ontology configuration from TOML (`[ontology]` section)

use bdi_domain::{ConfigIssue, ConfigIssueCode, TaxonomyOntology};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw concept taxonomy
///
/// # Example
///
/// ```toml
/// [ontology.is_a]
/// dog = "animal"
/// cat = "animal"
/// car = "vehicle"
///
/// [ontology]
/// disjoint = [["animal", "vehicle"], ["dog", "cat"]]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOntologyConfig {
    /// child concept -> parent concept
    pub is_a: BTreeMap<String, String>,
    /// Pairs of concepts nothing can be at once.
    pub disjoint: Vec<[String; 2]>,
}

impl FileOntologyConfig {
    pub fn is_empty(&self) -> bool {
        self.is_a.is_empty() && self.disjoint.is_empty()
    }

    pub fn to_ontology(&self) -> TaxonomyOntology {
        let mut ontology = TaxonomyOntology::new();
        for (child, parent) in &self.is_a {
            ontology.add_is_a(child.clone(), parent.clone());
        }
        for [a, b] in &self.disjoint {
            ontology.add_disjoint(a.clone(), b.clone());
        }
        ontology
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (child, parent) in &self.is_a {
            if child == parent {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidValue {
                        field: format!("ontology.is_a.{}", child),
                        value: parent.clone(),
                    },
                    format!("ontology.is_a: '{}' is declared its own parent", child),
                ));
            }
        }
        for [a, b] in &self.disjoint {
            if a == b {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidValue {
                        field: "ontology.disjoint".to_string(),
                        value: a.clone(),
                    },
                    format!("ontology.disjoint: '{}' cannot be disjoint with itself", a),
                ));
                continue;
            }
            for concept in [a, b] {
                if !self.declares(concept) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UnknownReference {
                            field: "ontology.disjoint".to_string(),
                            value: concept.clone(),
                        },
                        format!(
                            "ontology.disjoint: '{}' does not appear in ontology.is_a",
                            concept
                        ),
                    ));
                }
            }
        }
        issues
    }

    fn declares(&self, concept: &str) -> bool {
        self.is_a.contains_key(concept) || self.is_a.values().any(|p| p == concept)
    }
}
