/**
 * graph module
 *
 * - format: serialization chosen from the file extension
 * - snapshot: N-Triples snapshot next to the source, keyed by fingerprint
 * - store: GraphStore (load once, query many)
 */

pub mod format;
pub mod snapshot;
pub mod store;

pub use format::GraphFormat;
pub use snapshot::{decide, CacheDecision, ReparseReason, SourceFingerprint};
pub use store::{GraphStore, LoadOptions, LoadOrigin, RawResult};

/// Well-known vocabulary IRIs used by the built-in queries
pub mod vocab {
    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
    pub const SKOS_ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
    pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
}
