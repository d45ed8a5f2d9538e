// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Atomic snapshot read/write: the whole state tree persisted as one JSON
//! file, written via write-to-temp-then-rename so a crash mid-write never
//! leaves a torn file behind.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{Result, StorageError};
use crate::tables::RawTables;

const SNAPSHOT_FILE: &str = "state.json";

pub fn snapshot_path(state_dir: &Path) -> std::path::PathBuf {
    state_dir.join(SNAPSHOT_FILE)
}

/// Load the snapshot at `path`, or an empty table set if it does not exist
/// yet (first run).
pub fn load(path: &Path) -> Result<RawTables> {
    if !path.exists() {
        info!(path = %path.display(), "no snapshot found, starting with empty state");
        return Ok(RawTables::default());
    }
    let bytes = std::fs::read(path).map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;
    let tables: RawTables = serde_json::from_slice(&bytes)?;
    info!(
        path = %path.display(),
        repositories = tables.repositories.len(),
        sessions = tables.sessions.len(),
        jobs = tables.jobs.len(),
        "loaded snapshot"
    );
    Ok(tables)
}

/// Persist `tables` to `path` atomically.
pub fn save(path: &Path, tables: &RawTables) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(tables)?;
    std::fs::write(&tmp_path, &bytes).map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
    std::fs::rename(&tmp_path, path).map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

/// Log and drop a corrupted row rather than failing the whole load.
pub fn warn_corrupt_row(entity: &str, err: impl std::fmt::Display) {
    warn!(entity, error = %err, "skipping corrupted row on load");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::Repository;
    use std::path::PathBuf;

    #[test]
    fn missing_snapshot_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tables = load(&snapshot_path(dir.path())).expect("load");
        assert!(tables.repositories.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = snapshot_path(dir.path());
        let mut tables = RawTables::default();
        let repo = Repository::new("demo", PathBuf::from("/tmp/demo"));
        tables.repositories.insert(repo.id.to_string(), repo);

        save(&path, &tables).expect("save");
        let loaded = load(&path).expect("load");
        assert_eq!(loaded.repositories.len(), 1);
    }

    #[test]
    fn save_does_not_leave_a_temp_file_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = snapshot_path(dir.path());
        save(&path, &RawTables::default()).expect("save");
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.exists());
    }
}
