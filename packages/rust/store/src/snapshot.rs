//! Tender snapshot persistence.
//!
//! Each run's output fully replaces the prior snapshot. The write goes
//! to a sibling temp file first and is renamed into place, so the
//! target only ever holds either the old content or the complete new
//! content.

use std::path::{Path, PathBuf};

use serde::Serialize;

use civicwatch_shared::{CivicWatchError, Result, Tender};

/// Write the deduplicated collection to `path`, replacing any prior
/// snapshot. The parent directory is created if missing.
pub fn write_snapshot(path: &Path, tenders: &[Tender]) -> Result<()> {
    write_json_atomic(path, &tenders)?;
    tracing::info!(?path, count = tenders.len(), "snapshot written");
    Ok(())
}

/// Read the current snapshot. A missing file is an empty collection,
/// never an error; consumers only ever see the last completed run.
pub fn load_snapshot(path: &Path) -> Result<Vec<Tender>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| CivicWatchError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        CivicWatchError::Store(format!("corrupt snapshot at {}: {e}", path.display()))
    })
}

/// Serialize `value` pretty-printed and move it into place via a
/// temp-file rename. On any failure the existing file is untouched.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| CivicWatchError::io(parent, e))?;
        }
    }

    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| CivicWatchError::Store(format!("serialize failed: {e}")))?;

    let tmp = tmp_path(path);
    std::fs::write(&tmp, &json).map_err(|e| CivicWatchError::io(&tmp, e))?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        CivicWatchError::io(path, e)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
