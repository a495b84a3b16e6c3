/**
 * generator.rs
 * Category terms to regex alternation patterns
 */

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::vocabulary::CategoryTerms;

/// Category -> pattern, in category order
pub type PatternMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternGenerator {
    /// Wrap each pattern as `\b(?:...)\b`
    pub word_boundaries: bool,
}

impl PatternGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_word_boundaries(mut self, word_boundaries: bool) -> Self {
        self.word_boundaries = word_boundaries;
        self
    }

    /// One escaped, sorted alternation per non-empty category
    ///
    /// Output depends only on the input mapping, so regenerating from an
    /// unchanged graph yields the same patterns.
    pub fn generate(&self, terms: &CategoryTerms) -> PatternMap {
        let mut patterns = PatternMap::new();

        for (category, category_terms) in terms {
            if category_terms.is_empty() {
                warn!(category = %category, "category has no terms, skipping");
                continue;
            }

            // BTreeSet iterates in lexicographic order
            let alternation = category_terms
                .iter()
                .map(|term| regex::escape(term))
                .collect::<Vec<_>>()
                .join("|");

            let pattern = if self.word_boundaries {
                format!(r"\b(?:{})\b", alternation)
            } else {
                alternation
            };

            debug!(category = %category, terms = category_terms.len(), "generated pattern");
            patterns.insert(category.clone(), pattern);
        }

        patterns
    }
}
