/**
 * snapshot.rs
 * Parsed-graph snapshot kept next to the source file
 *
 * Layout: one JSON header line, then the triple set as N-Triples.
 *
 * ```text
 * {"version":1,"format":"RDF/XML","triples":4213,"fingerprint":{...}}
 * <https://ontology.example.org/A> <http://www.w3.org/2000/01/rdf-schema#label> "A"@en .
 * ...
 * ```
 *
 * Whether a snapshot may be used is decided by [`decide`] from fingerprints
 * alone. Anything else wrong with the file surfaces as a `CacheError`.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::errors::CacheError;
use crate::storage::write_atomic;

pub const SNAPSHOT_VERSION: u32 = 1;
pub const SNAPSHOT_SUFFIX: &str = "snapshot";

/// Identity of a source file: size, modification time and CRC32 of the bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFingerprint {
    pub len: u64,
    pub modified_secs: u64,
    pub modified_nanos: u32,
    pub checksum: String,
}

impl SourceFingerprint {
    pub fn compute(content: &[u8], metadata: &fs::Metadata) -> Self {
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();

        Self {
            len: content.len() as u64,
            modified_secs: modified.as_secs(),
            modified_nanos: modified.subsec_nanos(),
            checksum: checksum(content),
        }
    }
}

pub fn checksum(content: &[u8]) -> String {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(content);
    hex::encode(hasher.finalize().to_be_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotHeader {
    pub version: u32,
    pub format: String,
    pub triples: usize,
    pub fingerprint: SourceFingerprint,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub header: SnapshotHeader,
    pub ntriples: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparseReason {
    NoSnapshot,
    FingerprintChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    UseSnapshot,
    Reparse(ReparseReason),
}

/// Pure cache decision: a snapshot is usable only for the exact source it was taken from.
pub fn decide(current: &SourceFingerprint, cached: Option<&SourceFingerprint>) -> CacheDecision {
    match cached {
        None => CacheDecision::Reparse(ReparseReason::NoSnapshot),
        Some(cached) if cached == current => CacheDecision::UseSnapshot,
        Some(_) => CacheDecision::Reparse(ReparseReason::FingerprintChanged),
    }
}

/// `ontology.owl` -> `ontology.owl.snapshot`
pub fn snapshot_path(source: &Path) -> PathBuf {
    let mut name = source
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(SNAPSHOT_SUFFIX);
    source.with_file_name(name)
}

/// Read a snapshot; `Ok(None)` when there is none.
pub fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, CacheError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(corrupt(path, "snapshot is not valid UTF-8"));
        }
        Err(e) => return Err(CacheError::Io(e)),
    };

    decode(&content)
        .map(Some)
        .map_err(|reason| corrupt(path, &reason))
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), CacheError> {
    let encoded = encode(snapshot)?;
    write_atomic(path, encoded.as_bytes())?;
    Ok(())
}

fn encode(snapshot: &Snapshot) -> Result<String, CacheError> {
    let header = serde_json::to_string(&snapshot.header).map_err(|e| CacheError::Corrupt {
        path: PathBuf::new(),
        reason: e.to_string(),
    })?;
    let mut out = String::with_capacity(header.len() + snapshot.ntriples.len() + 1);
    out.push_str(&header);
    out.push('\n');
    out.push_str(&snapshot.ntriples);
    Ok(out)
}

fn decode(content: &str) -> Result<Snapshot, String> {
    let (header_line, body) = content
        .split_once('\n')
        .ok_or_else(|| "missing header line".to_string())?;

    let header: SnapshotHeader =
        serde_json::from_str(header_line).map_err(|e| format!("bad header: {}", e))?;

    if header.version != SNAPSHOT_VERSION {
        return Err(format!(
            "unsupported snapshot version {} (expected {})",
            header.version, SNAPSHOT_VERSION
        ));
    }

    Ok(Snapshot {
        header,
        ntriples: body.to_string(),
    })
}

fn corrupt(path: &Path, reason: &str) -> CacheError {
    CacheError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
