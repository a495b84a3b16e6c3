/**
 * artifact.rs
 * Serialization and atomic placement of generated artifacts
 */

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::errors::WriteError;
use crate::storage::write_atomic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
}

impl ArtifactFormat {
    /// YAML for `.yaml`/`.yml`, JSON otherwise
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ArtifactFormat::Yaml,
            _ => ArtifactFormat::Json,
        }
    }
}

/// Render `value`; always ends with a newline
pub fn render<T: Serialize>(value: &T, format: ArtifactFormat) -> Result<String, WriteError> {
    let mut out = match format {
        ArtifactFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| WriteError::Serialize(e.to_string()))?
        }
        ArtifactFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| WriteError::Serialize(e.to_string()))?
        }
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Serialize and replace `path` in one rename
pub fn write_artifact<T: Serialize>(value: &T, path: &Path) -> Result<(), WriteError> {
    let format = ArtifactFormat::from_path(path);
    let content = render(value, format)?;
    write_atomic(path, content.as_bytes())?;
    info!(path = %path.display(), format = ?format, bytes = content.len(), "artifact written");
    Ok(())
}
