//! JSON-backed documentation store, loaded once and kept for the process.

use super::{DocEntry, DocProvider};
use crate::error::{StoreError, StoreResult};
use crate::types::Owner;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Entries keyed by qualified name (`String#gsub`, `Kernel.puts`).
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    path: Option<PathBuf>,
    entries: HashMap<String, DocEntry>,
}

impl DocStore {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, DocEntry)>) -> Self {
        Self {
            path: None,
            entries: entries.into_iter().collect(),
        }
    }

    /// Load a store file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<String, DocEntry> =
            serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), entries = entries.len(), "loaded documentation store");
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    /// Load the store if the file exists; `Ok(None)` means not installed.
    pub fn open_optional(path: impl AsRef<Path>) -> StoreResult<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocProvider for DocStore {
    fn lookup(&self, owner: &Owner, name: &str) -> Option<DocEntry> {
        self.entries.get(&owner.qualify(name)).cloned()
    }
}
