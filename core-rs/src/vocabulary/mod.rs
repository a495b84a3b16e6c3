/**
 * vocabulary module
 *
 * - extractor: terms grouped by explicit category tag
 * - hierarchy: terms and class IRIs under configured root classes
 * - ambiguity: labels shared between classes
 */

pub mod ambiguity;
pub mod extractor;
pub mod hierarchy;

pub use ambiguity::{find_ambiguous_labels, values_clause, AmbiguityReport, LabelOccurrence};
pub use extractor::{merge_terms, CategoryMembership, CategoryTerms, VocabularyExtractor};
pub use hierarchy::{
    class_query, extract_category_classes, extract_root_categories, hierarchy_query, target_values_clause,
    CategoryClasses, ClassReport, RootClassCategory,
};
