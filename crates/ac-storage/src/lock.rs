// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Single-instance enforcement via an advisory-locked pid file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Result, StorageError};

/// Holds an exclusive advisory lock on `<state_dir>/agent-consoled.lock` for
/// the lifetime of the process. Released automatically on drop.
pub struct DaemonLock {
    path: PathBuf,
    file: std::fs::File,
}

impl DaemonLock {
    /// Acquire the lock, writing the current pid into the file.
    ///
    /// Uses `OpenOptions` rather than truncating up front, so that if the
    /// lock is already held, the running daemon's pid is left untouched.
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join("agent-consoled.lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| StorageError::Io { path: path.clone(), source })?;
        file.try_lock_exclusive().map_err(|_| StorageError::LockHeld(path.clone()))?;

        let mut file = file;
        file.set_len(0).map_err(|source| StorageError::Io { path: path.clone(), source })?;
        writeln!(file, "{}", std::process::id()).map_err(|source| StorageError::Io { path: path.clone(), source })?;

        Ok(Self { path, file })
    }
}

impl Drop for DaemonLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
