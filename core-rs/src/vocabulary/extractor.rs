/**
 * extractor.rs
 * Category-tagged vocabulary extraction
 *
 * An entity opts in by carrying one or more string tags on the category
 * predicate. Its `rdfs:label`, `skos:prefLabel` and `skos:altLabel` values
 * become terms of every category it is tagged with. Untagged entities are
 * never extracted.
 */

use oxigraph::model::Term;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::errors::QueryError;
use crate::graph::vocab::{RDFS_LABEL, SKOS_ALT_LABEL, SKOS_PREF_LABEL};
use crate::graph::{GraphStore, RawResult};

/// Category -> sorted, de-duplicated terms
pub type CategoryTerms = BTreeMap<String, BTreeSet<String>>;

pub const DEFAULT_MIN_TERM_LENGTH: usize = 2;

/// One (entity, category) tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CategoryMembership {
    pub entity: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct VocabularyExtractor {
    category_predicate: String,
    min_term_length: usize,
}

impl VocabularyExtractor {
    pub fn new(category_predicate: impl Into<String>) -> Self {
        Self {
            category_predicate: category_predicate.into(),
            min_term_length: DEFAULT_MIN_TERM_LENGTH,
        }
    }

    pub fn with_min_term_length(mut self, min_term_length: usize) -> Self {
        self.min_term_length = min_term_length;
        self
    }

    pub fn category_predicate(&self) -> &str {
        &self.category_predicate
    }

    /// The fixed extraction query
    pub fn query_text(&self) -> String {
        format!(
            r#"
            SELECT DISTINCT ?category ?term
            WHERE {{
                ?entity <{predicate}> ?category .
                {{ ?entity <{label}> ?term }}
                UNION
                {{ ?entity <{pref}> ?term }}
                UNION
                {{ ?entity <{alt}> ?term }}
                FILTER(isLiteral(?category) && isLiteral(?term))
            }}
            "#,
            predicate = self.category_predicate,
            label = RDFS_LABEL,
            pref = SKOS_PREF_LABEL,
            alt = SKOS_ALT_LABEL,
        )
    }

    /// Group label terms by category tag
    pub fn extract(&self, graph: &GraphStore) -> Result<CategoryTerms, QueryError> {
        let raw = graph.query(&self.query_text())?;

        let mut terms = CategoryTerms::new();
        let mut skipped = 0usize;

        for row in solution_rows(raw)? {
            let (Some(category), Some(term)) = (row.first(), row.get(1)) else {
                continue;
            };
            let (Some(category), Some(term)) = (literal_value(category), literal_value(term)) else {
                continue;
            };

            let category = category.trim();
            let term = term.trim();

            if category.is_empty() || term.chars().count() < self.min_term_length {
                skipped += 1;
                continue;
            }

            terms
                .entry(category.to_string())
                .or_default()
                .insert(term.to_string());
        }

        if skipped > 0 {
            debug!(skipped, min_term_length = self.min_term_length, "dropped short terms");
        }
        info!(
            categories = terms.len(),
            terms = terms.values().map(BTreeSet::len).sum::<usize>(),
            "extracted vocabulary"
        );

        Ok(terms)
    }

    /// Every entity/category tag as a sorted join table
    pub fn memberships(&self, graph: &GraphStore) -> Result<Vec<CategoryMembership>, QueryError> {
        let query = format!(
            "SELECT DISTINCT ?entity ?category WHERE {{ ?entity <{}> ?category FILTER(isLiteral(?category)) }}",
            self.category_predicate
        );

        let mut memberships: Vec<CategoryMembership> = solution_rows(graph.query(&query)?)?
            .into_iter()
            .filter_map(|row| {
                let entity = match row.first()?.as_ref()? {
                    Term::NamedNode(node) => node.as_str().to_string(),
                    Term::BlankNode(node) => format!("_:{}", node.as_str()),
                    _ => return None,
                };
                let category = literal_value(row.get(1)?)?.trim().to_string();
                (!category.is_empty()).then_some(CategoryMembership { entity, category })
            })
            .collect();

        memberships.sort();
        memberships.dedup();
        Ok(memberships)
    }
}

/// Union `other` into `into`, category by category
pub fn merge_terms(into: &mut CategoryTerms, other: CategoryTerms) {
    for (category, terms) in other {
        into.entry(category).or_default().extend(terms);
    }
}

pub(crate) fn solution_rows(raw: RawResult) -> Result<Vec<Vec<Option<Term>>>, QueryError> {
    match raw {
        RawResult::Solutions { rows, .. } => Ok(rows),
        _ => Err(QueryError::Evaluation("expected a SELECT result".to_string())),
    }
}

pub(crate) fn literal_value(term: &Option<Term>) -> Option<&str> {
    match term {
        Some(Term::Literal(literal)) => Some(literal.value()),
        _ => None,
    }
}
