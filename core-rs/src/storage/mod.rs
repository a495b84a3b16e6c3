// storage/mod.rs - Atomic file replacement for generated artifacts and snapshots

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::WriteError;

/// Write `contents` to `path` so a concurrent reader sees either the old file
/// or the new one, never a prefix of the new one.
///
/// The temporary file lives in the destination directory so the final
/// `rename` stays on one filesystem.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&parent).map_err(|source| WriteError::Io {
        path: parent.clone(),
        source,
    })?;

    let temp_path = temp_path_for(path, &parent);

    let result = write_and_sync(&temp_path, contents).and_then(|_| {
        fs::rename(&temp_path, path).map_err(|source| WriteError::Persist {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        fs::remove_file(&temp_path).ok();
    }

    result
}

fn write_and_sync(temp_path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let io_err = |source| WriteError::Io {
        path: temp_path.to_path_buf(),
        source,
    };

    let mut file = File::create(temp_path).map_err(io_err)?;
    file.write_all(contents).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    Ok(())
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `.patterns.json.<pid>.<n>.tmp` next to `patterns.json`
fn temp_path_for(path: &Path, parent: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    parent.join(format!(".{}.{}.{}.tmp", file_name, std::process::id(), n))
}
