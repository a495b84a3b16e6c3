//! # Canon Core - ontology vocabulary and query toolkit
//!
//! Loads an RDF/OWL graph once per process and derives two kinds of artifact
//! from it:
//!
//! - regex patterns, one per category, built from the labels of entities that
//!   carry an explicit category tag (for consumers that do not speak SPARQL)
//! - rendered results of catalogued or ad-hoc SPARQL queries
//!
//! ## Architecture
//!
//! ```text
//!   sources/ontology.owl ──► GraphStore ◄── ontology.owl.snapshot
//!                               │
//!            ┌──────────────────┼──────────────────┐
//!            ▼                  ▼                  ▼
//!   VocabularyExtractor   QueryEngine (x2)    find_ambiguous_labels
//!            │                  │
//!            ▼                  ▼
//!   PatternGenerator      dispatcher::execute
//!            │                  │
//!            ▼                  ▼
//!   generated/patterns.json   stdout
//! ```
//!
//! The graph is read-only after load; every read path takes `&GraphStore`
//! and may run on several threads at once.

pub mod errors;
pub mod graph;
pub mod patterns;
pub mod project;
pub mod query;
pub mod storage;
pub mod vocabulary;

pub use errors::{CacheError, CanonError, CatalogError, ConfigError, LoadError, QueryError, WriteError};
pub use graph::{GraphFormat, GraphStore, LoadOptions, LoadOrigin, RawResult};
pub use patterns::{write_artifact, ArtifactFormat, PatternGenerator, PatternMap};
pub use project::{CanonConfig, CategoryConfig, PatternSettings, QueryDirs, RootClass, CONFIG_FILE_NAME};
pub use query::{
    execute, BoundedUnionEngine, Dialect, QueryCatalog, QueryDescriptor, QueryEngine, QueryIdentifier,
    RecursivePathEngine, RenderedResult, ResolvedQuery,
};
pub use vocabulary::{
    extract_category_classes, extract_root_categories, find_ambiguous_labels, merge_terms, values_clause,
    AmbiguityReport, CategoryClasses, CategoryMembership, CategoryTerms, ClassReport, RootClassCategory,
    VocabularyExtractor,
};

/// Crate version, as reported by `canon --version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Query file extension recognised by catalogs
pub const QUERY_EXTENSION: &str = query::catalog::QUERY_EXTENSION;
