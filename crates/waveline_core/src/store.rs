// SPDX-License-Identifier: MIT OR Apache-2.0
//! Durable storage for the enemy type registry.
//!
//! The registry itself stays a pure in-memory store; this module provides the
//! collaborator it writes through. The on-disk format is a single JSON array
//! of all entries, rewritten in full on every registry mutation and read once
//! at startup.

use crate::registry::EnemyType;
use std::path::{Path, PathBuf};

/// File name of the persisted enemy registry snapshot.
pub const ENEMY_TYPES_FILE: &str = "enemy_types.json";

/// Error raised by a registry store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying file I/O failed
    #[error("registry store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot could not be encoded or decoded
    #[error("registry store codec error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load/save boundary for the enemy registry's persisted entry set.
///
/// Implementations must treat `save` as a full-snapshot overwrite; `load`
/// returns `Ok(None)` when no snapshot exists yet.
pub trait RegistryStore {
    /// Read the persisted entry set, if any.
    fn load(&self) -> Result<Option<Vec<EnemyType>>, StoreError>;

    /// Overwrite the persisted entry set with `entries`.
    fn save(&self, entries: &[EnemyType]) -> Result<(), StoreError>;
}

/// Registry store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileRegistryStore {
    path: PathBuf,
}

impl FileRegistryStore {
    /// Create a store writing to the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store using the conventional file name inside a directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(ENEMY_TYPES_FILE),
        }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for FileRegistryStore {
    fn load(&self) -> Result<Option<Vec<EnemyType>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let entries: Vec<EnemyType> = serde_json::from_str(&content)?;
        Ok(Some(entries))
    }

    fn save(&self, entries: &[EnemyType]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
