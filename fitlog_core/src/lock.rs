//! Sidecar lock files.
//!
//! Files that get renamed or replaced (the journal on rollup, the user
//! registry on save) can't carry their own lock across the swap, so writers
//! coordinate on a `<name>.lock` file next to them instead.

use crate::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Held lock on `<path>.lock`, released on drop
#[derive(Debug)]
pub(crate) struct LockFile {
    file: File,
}

impl LockFile {
    /// Path of the lock guarding `path`
    pub(crate) fn path_for(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Block until the exclusive lock for `path` is held.
    ///
    /// Creates the parent directory if needed.
    pub(crate) fn exclusive(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = Self::open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    /// Block until a shared lock for `path` is held.
    ///
    /// Returns `None` when the parent directory doesn't exist yet: nothing
    /// has been written there, so there is nothing to guard.
    pub(crate) fn shared(path: &Path) -> Result<Option<Self>> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if parent.is_some_and(|parent| !parent.exists()) {
            return Ok(None);
        }
        let file = Self::open(path)?;
        file.lock_shared()?;
        Ok(Some(Self { file }))
    }

    fn open(path: &Path) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(Self::path_for(path))?)
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release lock: {}", e);
        }
    }
}
