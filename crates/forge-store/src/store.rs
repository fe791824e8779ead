//! Document store - per-file document snapshots and the modified set.
//!
//! Holds the current in-memory state of every open file and tracks which
//! files have unsaved changes. The store owns its documents outright:
//! `get` hands out clones and `set` takes ownership, so the canonical copy
//! never aliases caller-held memory.

use crate::error::{Result, StoreError};
use forge_data::{json, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identifier of one logical file: its path within the workspace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(PathBuf);

impl FileId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for FileId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for FileId {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&str> for FileId {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Per-file document snapshots plus the set of files with unsaved changes.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<FileId, Value>,
    modified: HashSet<FileId>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Documents ===

    /// Get a copy of the stored document, or `None` if the file is unknown.
    pub fn get(&self, file: &FileId) -> Option<Value> {
        self.documents.get(file).cloned()
    }

    pub fn contains(&self, file: &FileId) -> bool {
        self.documents.contains_key(file)
    }

    /// Replace the stored document for `file`.
    pub fn set(&mut self, file: FileId, document: Value) {
        debug!(%file, "updating stored document");
        self.documents.insert(file, document);
    }

    /// Drop the stored document and its modified flag.
    pub fn remove(&mut self, file: &FileId) -> Option<Value> {
        self.modified.remove(file);
        self.documents.remove(file)
    }

    // === Modified tracking ===

    pub fn mark_modified(&mut self, file: &FileId) {
        self.modified.insert(file.clone());
    }

    pub fn clear_modified(&mut self, file: &FileId) {
        self.modified.remove(file);
    }

    pub fn is_modified(&self, file: &FileId) -> bool {
        self.modified.contains(file)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Files with unsaved changes, sorted for stable iteration.
    pub fn modified_files(&self) -> Vec<FileId> {
        let mut files: Vec<_> = self.modified.iter().cloned().collect();
        files.sort();
        files
    }

    /// Mark every file as saved without writing anything.
    pub fn mark_all_saved(&mut self) {
        debug!("marking all changes as saved");
        self.modified.clear();
    }

    // === Persistence ===

    /// Save the stored document for `file` to disk.
    ///
    /// Returns `Ok(false)` without writing when the file has no unsaved
    /// changes. On success the modified flag is cleared; on failure it is
    /// left set so the save can be retried.
    pub fn save(&mut self, file: &FileId) -> Result<bool> {
        let document = self
            .documents
            .get(file)
            .ok_or_else(|| StoreError::DocumentNotFound(file.to_string()))?;

        if !self.modified.contains(file) {
            debug!(%file, "no unsaved changes, skipping save");
            return Ok(false);
        }

        json::write_json_file(file.as_path(), document)?;
        self.modified.remove(file);
        debug!(%file, "saved document");
        Ok(true)
    }
}
