//! JSON file I/O for editor documents.
//!
//! Documents are stored as UTF-8 JSON with 4-space indentation. Other
//! tooling diffs these files and keeps them under version control, so the
//! on-disk format is a contract. Writes are staged to a temp file in the
//! target directory and renamed into place, so a failure mid-serialization
//! never leaves a truncated document behind.

use crate::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Serialize `value` in the editor's on-disk format (4-space indent).
pub fn to_document_string(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Read a JSON document from `path`.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write `value` to `path`: parent directories are created, the document is
/// staged next to its target, then renamed over it.
pub fn write_json_file(path: &Path, value: &Value) -> Result<()> {
    let mut batch = WriteBatch::new();
    batch.stage(path, value)?;
    batch.commit()
}

/// A stage-then-commit batch of JSON writes.
///
/// Every file is fully serialized to a temp file next to its target before
/// any rename happens, so a serialization or write failure while staging
/// leaves no partial state. Dropping an uncommitted batch removes its
/// staged files.
#[derive(Debug, Default)]
pub struct WriteBatch {
    staged: Vec<(PathBuf, PathBuf)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` into a staged temp file for `path`.
    pub fn stage(&mut self, path: &Path, value: &Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = to_document_string(value)?;
        let temp = temp_path_for(path, self.staged.len());
        fs::write(&temp, text.as_bytes())?;
        self.staged.push((temp, path.to_path_buf()));
        Ok(())
    }

    /// Rename every staged file into place, in staging order.
    pub fn commit(mut self) -> Result<()> {
        while !self.staged.is_empty() {
            let (temp, target) = self.staged.remove(0);
            fs::rename(&temp, &target)?;
        }
        Ok(())
    }
}

impl Drop for WriteBatch {
    fn drop(&mut self) {
        for (temp, _) in &self.staged {
            let _ = fs::remove_file(temp);
        }
    }
}

fn temp_path_for(path: &Path, ordinal: usize) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{}.tmp{}-{}", name, std::process::id(), ordinal))
}
