//! Graph file serializations, selected by file extension only.

use oxigraph::io::RdfFormat;
use std::fmt;
use std::path::Path;

use crate::errors::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphFormat {
    /// Verbose XML-based RDF (`.owl`, `.rdf`, `.xml`)
    RdfXml,
    /// Compact Turtle (`.ttl`)
    Turtle,
    /// Line-oriented N-Triples (`.nt`)
    NTriples,
    /// Notation3 (`.n3`)
    N3,
}

impl GraphFormat {
    /// Pick the serialization from the path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Self::from_extension(&ext).ok_or_else(|| LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            ext,
        })
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "owl" | "rdf" | "xml" => Some(GraphFormat::RdfXml),
            "ttl" => Some(GraphFormat::Turtle),
            "nt" => Some(GraphFormat::NTriples),
            "n3" => Some(GraphFormat::N3),
            _ => None,
        }
    }

    pub fn rdf_format(self) -> RdfFormat {
        match self {
            GraphFormat::RdfXml => RdfFormat::RdfXml,
            GraphFormat::Turtle => RdfFormat::Turtle,
            GraphFormat::NTriples => RdfFormat::NTriples,
            GraphFormat::N3 => RdfFormat::N3,
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphFormat::RdfXml => "RDF/XML",
            GraphFormat::Turtle => "Turtle",
            GraphFormat::NTriples => "N-Triples",
            GraphFormat::N3 => "N3",
        };
        f.write_str(name)
    }
}
