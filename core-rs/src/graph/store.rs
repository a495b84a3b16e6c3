/**
 * store.rs
 * In-memory RDF graph loaded once per process, backed by Oxigraph
 */

use oxigraph::model::{Term, Triple};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{CacheError, LoadError, QueryError};
use crate::graph::format::GraphFormat;
use crate::graph::snapshot::{
    self, CacheDecision, Snapshot, SnapshotHeader, SourceFingerprint, SNAPSHOT_VERSION,
};

/// How the triples of a [`GraphStore`] were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Full parse of the source file (or of in-memory text)
    Parsed,
    /// Restored from a snapshot whose fingerprint matched the source
    Snapshot,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Read and refresh the snapshot next to the source file
    pub use_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Fully materialised query result, before any presentation
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Solutions {
        variables: Vec<String>,
        /// One entry per variable, `None` when unbound
        rows: Vec<Vec<Option<Term>>>,
    },
    Graph(Vec<Triple>),
    Boolean(bool),
}

/// Read-only triple set. Cloning shares the underlying store.
#[derive(Clone)]
pub struct GraphStore {
    store: Store,
    source: Option<PathBuf>,
    format: GraphFormat,
    triple_count: usize,
    origin: LoadOrigin,
}

impl fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("source", &self.source)
            .field("format", &self.format)
            .field("triple_count", &self.triple_count)
            .field("origin", &self.origin)
            .finish()
    }
}

impl GraphStore {
    /// Load a graph file, using its snapshot when still valid
    ///
    /// # Example
    /// ```no_run
    /// # use canon_core::GraphStore;
    /// let graph = GraphStore::load("sources/ontology-semantic-canon.owl")?;
    /// println!("{} triples", graph.triple_count());
    /// # Ok::<(), canon_core::LoadError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Self::load_with(path, &LoadOptions::default())
    }

    pub fn load_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let format = GraphFormat::from_path(path)?;

        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let content = fs::read(path).map_err(io_err)?;
        let metadata = fs::metadata(path).map_err(io_err)?;
        let fingerprint = SourceFingerprint::compute(&content, &metadata);
        let snapshot_path = snapshot::snapshot_path(path);

        if options.use_cache {
            match restore_snapshot(&snapshot_path, &fingerprint) {
                Ok((store, triple_count)) => {
                    info!(path = %path.display(), triples = triple_count, "loaded graph from snapshot");
                    return Ok(Self {
                        store,
                        source: Some(path.to_path_buf()),
                        format,
                        triple_count,
                        origin: LoadOrigin::Snapshot,
                    });
                }
                Err(CacheError::Missing(_)) | Err(CacheError::Stale(_)) => {
                    debug!(path = %path.display(), "snapshot unusable, parsing source");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "discarding snapshot");
                }
            }
        }

        info!(path = %path.display(), format = %format, "parsing graph");
        let store = parse_into_store(&content, format)
            .map_err(|message| LoadError::Parse {
                path: path.to_path_buf(),
                message,
            })?;

        let graph = Self::from_store(store, Some(path.to_path_buf()), format)?;
        info!(path = %path.display(), triples = graph.triple_count, "graph parsed");

        if options.use_cache {
            if let Err(e) = graph.save_snapshot(&snapshot_path, fingerprint) {
                warn!(path = %snapshot_path.display(), error = %e, "could not save snapshot");
            }
        }

        Ok(graph)
    }

    /// Parse in-memory graph text. Never touches the filesystem.
    pub fn parse(content: &str, format: GraphFormat) -> Result<Self, LoadError> {
        let store = parse_into_store(content.as_bytes(), format).map_err(|message| LoadError::Parse {
            path: PathBuf::from("<memory>"),
            message,
        })?;
        Self::from_store(store, None, format)
    }

    fn from_store(store: Store, source: Option<PathBuf>, format: GraphFormat) -> Result<Self, LoadError> {
        let triple_count = store.len().map_err(|e| LoadError::Store(e.to_string()))?;
        Ok(Self {
            store,
            source,
            format,
            triple_count,
            origin: LoadOrigin::Parsed,
        })
    }

    pub fn triple_count(&self) -> usize {
        self.triple_count
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn format(&self) -> GraphFormat {
        self.format
    }

    /// Every triple in the graph, in store order
    pub fn triples(&self) -> Result<Vec<Triple>, LoadError> {
        self.store
            .iter()
            .map(|quad| {
                quad.map(|q| Triple::new(q.subject, q.predicate, q.object))
                    .map_err(|e| LoadError::Store(e.to_string()))
            })
            .collect()
    }

    /// Execute SPARQL and materialise the whole result
    ///
    /// Syntax errors carry the SPARQL parser's diagnostic.
    pub fn query(&self, query: &str) -> Result<RawResult, QueryError> {
        spargebra::Query::parse(query, None).map_err(|e| QueryError::Syntax(e.to_string()))?;
        self.evaluate(query)
    }

    /// Evaluate text that has already passed the parser
    pub(crate) fn evaluate(&self, query: &str) -> Result<RawResult, QueryError> {
        let eval_err = |e: oxigraph::sparql::EvaluationError| QueryError::Evaluation(e.to_string());

        let results = self.store.query(query).map_err(eval_err)?;

        match results {
            QueryResults::Solutions(solutions) => {
                let variables: Vec<String> = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();

                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(eval_err)?;
                    rows.push((0..variables.len()).map(|i| solution.get(i).cloned()).collect());
                }

                Ok(RawResult::Solutions { variables, rows })
            }
            QueryResults::Boolean(result) => Ok(RawResult::Boolean(result)),
            QueryResults::Graph(triples) => {
                let triples = triples
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(eval_err)?;
                Ok(RawResult::Graph(triples))
            }
        }
    }

    fn save_snapshot(&self, path: &Path, fingerprint: SourceFingerprint) -> Result<(), CacheError> {
        let triples = self.triples().map_err(|e| CacheError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut lines: Vec<String> = triples.iter().map(|t| format!("{} .", t)).collect();
        lines.sort();

        let mut ntriples = lines.join("\n");
        if !ntriples.is_empty() {
            ntriples.push('\n');
        }

        let snapshot = Snapshot {
            header: SnapshotHeader {
                version: SNAPSHOT_VERSION,
                format: self.format.to_string(),
                triples: self.triple_count,
                fingerprint,
            },
            ntriples,
        };

        snapshot::write_snapshot(path, &snapshot)?;
        debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }
}

fn parse_into_store(content: &[u8], format: GraphFormat) -> Result<Store, String> {
    let store = Store::new().map_err(|e| e.to_string())?;
    store
        .load_from_reader(format.rdf_format(), content)
        .map_err(|e| e.to_string())?;
    Ok(store)
}

fn restore_snapshot(path: &Path, fingerprint: &SourceFingerprint) -> Result<(Store, usize), CacheError> {
    let snapshot = snapshot::read_snapshot(path)?;

    match snapshot::decide(fingerprint, snapshot.as_ref().map(|s| &s.header.fingerprint)) {
        CacheDecision::UseSnapshot => {}
        CacheDecision::Reparse(snapshot::ReparseReason::NoSnapshot) => {
            return Err(CacheError::Missing(path.to_path_buf()));
        }
        CacheDecision::Reparse(snapshot::ReparseReason::FingerprintChanged) => {
            return Err(CacheError::Stale(path.to_path_buf()));
        }
    }

    let snapshot = snapshot.ok_or_else(|| CacheError::Missing(path.to_path_buf()))?;
    let corrupt = |reason: String| CacheError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let store = parse_into_store(snapshot.ntriples.as_bytes(), GraphFormat::NTriples).map_err(corrupt)?;
    let count = store.len().map_err(|e| corrupt(e.to_string()))?;

    if count != snapshot.header.triples {
        return Err(corrupt(format!(
            "header records {} triples, body has {}",
            snapshot.header.triples, count
        )));
    }

    Ok((store, count))
}

impl RawResult {
    pub fn is_boolean(&self) -> bool {
        matches!(self, RawResult::Boolean(_))
    }
}
