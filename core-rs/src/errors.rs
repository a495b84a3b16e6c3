//! Error types for Canon Core
//!
//! One enum per concern. `CacheError` never leaves the graph store: a bad
//! snapshot always degrades to a full re-parse.

use std::path::PathBuf;
use thiserror::Error;

/// Graph file could not be turned into a [`crate::GraphStore`].
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Graph file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported graph serialization for {} (extension: {ext})", .path.display())]
    UnsupportedFormat { path: PathBuf, ext: String },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Oxigraph error: {0}")]
    Store(String),
}

/// SPARQL text could not be parsed or evaluated.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("SPARQL syntax error: {0}")]
    Syntax(String),

    #[error("Unsupported by {engine} engine: {feature}")]
    Unsupported {
        engine: &'static str,
        feature: String,
    },

    #[error("Query evaluation failed: {0}")]
    Evaluation(String),
}

/// Snapshot cache problems. Recovered inside the graph store.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No snapshot at {}", .0.display())]
    Missing(PathBuf),

    #[error("Snapshot is stale for {}", .0.display())]
    Stale(PathBuf),

    #[error("Corrupt snapshot {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot write failed: {0}")]
    Write(#[from] WriteError),
}

/// Query identifier or catalog directory could not be resolved.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Query directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("No {dialect} query found matching '{identifier}'")]
    NotFound {
        identifier: String,
        dialect: &'static str,
    },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Artifact could not be written and moved into place.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to serialize artifact: {0}")]
    Serialize(String),

    #[error("IO error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {} into place at {}: {source}", .from.display(), .to.display())]
    Persist {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// canon.yaml problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid canon.yaml: {0}")]
    Parse(String),

    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum CanonError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CanonError>;
