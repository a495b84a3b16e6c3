/**
 * catalog.rs
 * Query file discovery and identifier resolution
 *
 * A catalog is one flat directory of `.rq` files. Files named with a numeric
 * prefix (`01-list-classes.rq`) are addressable by that number.
 */

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::CatalogError;
use crate::query::engine::Dialect;

pub const QUERY_EXTENSION: &str = "rq";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// File stem, e.g. `01-list-classes`
    pub name: String,
    pub path: PathBuf,
    /// Leading digits of the name, if any
    pub index: Option<u32>,
}

impl QueryDescriptor {
    fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_stem()?.to_str()?.to_string();
        let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
        let index = digits.parse().ok();
        Some(Self { name, path, index })
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, QUERY_EXTENSION)
    }
}

/// How the caller named the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIdentifier {
    /// Bare digits, e.g. `1` or `01`
    Numeric(String),
    /// Query text given with the inline flag
    Inline(String),
    /// A path, or a file name prefix inside the catalog
    Path(PathBuf),
}

impl QueryIdentifier {
    /// Interpret a positional CLI argument. Inline text never comes through here.
    pub fn parse_positional(arg: &str) -> Self {
        let trimmed = arg.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            QueryIdentifier::Numeric(trimmed.to_string())
        } else {
            QueryIdentifier::Path(PathBuf::from(arg))
        }
    }
}

/// Query text plus a label for headings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub label: String,
    pub text: String,
}

/// Listing of one dialect's query directory
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    dialect: Dialect,
    directory: PathBuf,
    entries: Vec<QueryDescriptor>,
}

impl QueryCatalog {
    /// List `*.rq` files directly inside `directory`
    ///
    /// Numbered files come first in index order, then the rest by name.
    pub fn discover<P: AsRef<Path>>(directory: P, dialect: Dialect) -> Result<Self, CatalogError> {
        let directory = directory.as_ref();

        if !directory.is_dir() {
            return Err(CatalogError::DirectoryMissing(directory.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| CatalogError::Io {
                path: directory.to_path_buf(),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|s| s.to_str()) != Some(QUERY_EXTENSION) {
                continue;
            }
            if let Some(descriptor) = QueryDescriptor::from_path(entry.into_path()) {
                entries.push(descriptor);
            }
        }

        entries.sort_by(|a, b| {
            (a.index.is_none(), a.index, &a.name).cmp(&(b.index.is_none(), b.index, &b.name))
        });

        debug!(dir = %directory.display(), dialect = %dialect, count = entries.len(), "discovered queries");

        Ok(Self {
            dialect,
            directory: directory.to_path_buf(),
            entries,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn entries(&self) -> &[QueryDescriptor] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by 1-based menu position
    pub fn get(&self, position: usize) -> Option<&QueryDescriptor> {
        position.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// First entry matching a numeric token, by index value then by name prefix
    ///
    /// Only one- and two-digit tokens compare by value, so `1` finds `01-...`
    /// while `001` must be a literal file name prefix.
    pub fn find_numeric(&self, token: &str) -> Option<&QueryDescriptor> {
        let wanted: Option<u32> = if token.len() <= 2 { token.parse().ok() } else { None };
        self.entries
            .iter()
            .find(|d| wanted.is_some() && d.index == wanted)
            .or_else(|| self.find_prefix(token))
    }

    pub fn find_prefix(&self, prefix: &str) -> Option<&QueryDescriptor> {
        self.entries
            .iter()
            .find(|d| d.name.starts_with(prefix) || d.file_name().starts_with(prefix))
    }

    pub fn resolve(&self, identifier: &QueryIdentifier) -> Result<ResolvedQuery, CatalogError> {
        match identifier {
            QueryIdentifier::Inline(text) => Ok(ResolvedQuery {
                label: "inline query".to_string(),
                text: text.clone(),
            }),
            QueryIdentifier::Numeric(token) => {
                let descriptor = self.find_numeric(token).ok_or_else(|| self.not_found(token))?;
                read_descriptor(descriptor)
            }
            QueryIdentifier::Path(path) => {
                if path.is_file() {
                    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    let label = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string());
                    return Ok(ResolvedQuery { label, text });
                }

                let token = path.to_string_lossy();
                let descriptor = self.find_prefix(&token).ok_or_else(|| self.not_found(&token))?;
                read_descriptor(descriptor)
            }
        }
    }

    fn not_found(&self, identifier: &str) -> CatalogError {
        CatalogError::NotFound {
            identifier: identifier.to_string(),
            dialect: self.dialect.label(),
        }
    }
}

pub fn read_descriptor(descriptor: &QueryDescriptor) -> Result<ResolvedQuery, CatalogError> {
    let text = fs::read_to_string(&descriptor.path).map_err(|source| CatalogError::Io {
        path: descriptor.path.clone(),
        source,
    })?;
    Ok(ResolvedQuery {
        label: descriptor.file_name(),
        text,
    })
}
