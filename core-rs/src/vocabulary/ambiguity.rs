/**
 * ambiguity.rs
 * Labels shared by more than one class
 *
 * Only named `owl:Class` entities inside the configured namespace are
 * scanned. Labels are compared lower-cased and trimmed.
 */

use oxigraph::model::Term;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::errors::QueryError;
use crate::graph::vocab::{OWL_CLASS, OWL_THING, RDFS_LABEL, RDFS_SUBCLASS_OF, SKOS_ALT_LABEL};
use crate::graph::GraphStore;
use crate::vocabulary::extractor::{literal_value, solution_rows};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOccurrence {
    pub uri: String,
    /// Label as written in the graph
    pub label: String,
    pub is_alt: bool,
    /// Labels of direct superclasses other than owl:Thing
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AmbiguityReport {
    /// Normalised label -> every occurrence
    pub labels: BTreeMap<String, Vec<LabelOccurrence>>,
}

impl AmbiguityReport {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Distinct class IRIs involved, sorted
    pub fn uris(&self) -> BTreeSet<&str> {
        self.labels
            .values()
            .flatten()
            .map(|occurrence| occurrence.uri.as_str())
            .collect()
    }
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

pub fn find_ambiguous_labels(graph: &GraphStore, namespace: &str) -> Result<AmbiguityReport, QueryError> {
    let parents = parent_labels(graph)?;
    let mut by_label: BTreeMap<String, Vec<LabelOccurrence>> = BTreeMap::new();

    for (predicate, is_alt) in [(RDFS_LABEL, false), (SKOS_ALT_LABEL, true)] {
        let query = format!(
            "SELECT DISTINCT ?class ?label WHERE {{ ?class a <{}> ; <{}> ?label . FILTER(isIRI(?class) && isLiteral(?label)) }}",
            OWL_CLASS, predicate
        );

        for row in solution_rows(graph.query(&query)?)? {
            let Some(Some(Term::NamedNode(class))) = row.first() else {
                continue;
            };
            if !class.as_str().starts_with(namespace) {
                continue;
            }
            let Some(label) = row.get(1).and_then(literal_value) else {
                continue;
            };

            by_label
                .entry(normalize_label(label))
                .or_default()
                .push(LabelOccurrence {
                    uri: class.as_str().to_string(),
                    label: label.to_string(),
                    is_alt,
                    parents: parents.get(class.as_str()).cloned().unwrap_or_default(),
                });
        }
    }

    let labels: BTreeMap<String, Vec<LabelOccurrence>> = by_label
        .into_iter()
        .filter(|(_, occurrences)| {
            occurrences
                .iter()
                .map(|o| o.uri.as_str())
                .collect::<BTreeSet<_>>()
                .len()
                > 1
        })
        .map(|(label, mut occurrences)| {
            occurrences.sort();
            (label, occurrences)
        })
        .collect();

    info!(ambiguous = labels.len(), namespace = %namespace, "scanned class labels");

    Ok(AmbiguityReport { labels })
}

fn parent_labels(graph: &GraphStore) -> Result<BTreeMap<String, Vec<String>>, QueryError> {
    let query = format!(
        "SELECT DISTINCT ?class ?parentLabel WHERE {{ ?class a <{class}> ; <{sub}> ?parent . ?parent <{label}> ?parentLabel . FILTER(?parent != <{thing}>) }}",
        class = OWL_CLASS,
        sub = RDFS_SUBCLASS_OF,
        label = RDFS_LABEL,
        thing = OWL_THING,
    );

    let mut parents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in solution_rows(graph.query(&query)?)? {
        let Some(Some(Term::NamedNode(class))) = row.first() else {
            continue;
        };
        if let Some(label) = row.get(1).and_then(literal_value) {
            parents
                .entry(class.as_str().to_string())
                .or_default()
                .insert(label.to_string());
        }
    }

    Ok(parents
        .into_iter()
        .map(|(class, labels)| (class, labels.into_iter().collect()))
        .collect())
}

/// SPARQL `VALUES ?class { ... }` block over every involved IRI
pub fn values_clause(report: &AmbiguityReport) -> String {
    let uris = report.uris();
    if uris.is_empty() {
        return "VALUES ?class { }".to_string();
    }

    let mut out = String::from("VALUES ?class {\n");
    for uri in uris {
        out.push_str(&format!("  <{}>\n", uri));
    }
    out.push('}');
    out
}
