//! Data paths - addressing values inside a JSON-like document tree.
//!
//! A path is an ordered list of object member names and array indices; the
//! empty path addresses the document root. Writers create intermediate
//! containers as they descend, readers never do.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A single step in a [`DataPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathKey {
    /// Object member name.
    Key(String),
    /// Array index.
    Index(usize),
}

impl PathKey {
    pub fn is_index(&self) -> bool {
        matches!(self, PathKey::Index(_))
    }
}

impl std::fmt::Display for PathKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathKey::Key(k) => write!(f, "{}", k),
            PathKey::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        PathKey::Key(key.to_string())
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

/// A path into a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataPath(Vec<PathKey>);

impl DataPath {
    /// Create an empty (root) path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from keys.
    pub fn new(keys: Vec<PathKey>) -> Self {
        Self(keys)
    }

    /// Parse a path from dot notation (e.g., "weapon.damage" or "turrets.0.yaw").
    /// Purely numeric segments become array indices.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        let keys = path
            .split('.')
            .map(|s| {
                if let Ok(idx) = s.parse::<usize>() {
                    PathKey::Index(idx)
                } else {
                    PathKey::Key(s.to_string())
                }
            })
            .collect();
        Self(keys)
    }

    /// Get the keys.
    pub fn keys(&self) -> &[PathKey] {
        &self.0
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the parent path.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get the last key.
    pub fn last(&self) -> Option<&PathKey> {
        self.0.last()
    }

    /// Append a key.
    pub fn push(&mut self, key: PathKey) {
        self.0.push(key);
    }

    /// Create a child path with an object member name.
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.push(PathKey::Key(key.into()));
        new
    }

    /// Create a child path with an array index.
    pub fn child_index(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.push(PathKey::Index(index));
        new
    }
}

impl std::fmt::Display for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: Vec<String> = self.0.iter().map(|k| k.to_string()).collect();
        write!(f, "{}", s.join("."))
    }
}

impl From<Vec<PathKey>> for DataPath {
    fn from(keys: Vec<PathKey>) -> Self {
        Self(keys)
    }
}

/// Read the value at `path`, without creating intermediate containers.
///
/// Returns `None` when any step of the path is missing or addresses the
/// wrong kind of container.
pub fn read_path<'a>(root: &'a Value, path: &DataPath) -> Option<&'a Value> {
    let mut current = root;
    for key in path.keys() {
        current = match (current, key) {
            (Value::Object(map), PathKey::Key(k)) => map.get(k)?,
            (Value::Array(seq), PathKey::Index(i)) => seq.get(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable variant of [`read_path`]. Still never auto-vivifies.
pub fn read_path_mut<'a>(root: &'a mut Value, path: &DataPath) -> Option<&'a mut Value> {
    let mut current = root;
    for key in path.keys() {
        current = match (current, key) {
            (Value::Object(map), PathKey::Key(k)) => map.get_mut(k)?,
            (Value::Array(seq), PathKey::Index(i)) => seq.get_mut(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

/// The container created for a missing intermediate step: an array when the
/// next key is an index, an object otherwise.
fn empty_container(next: &PathKey) -> Value {
    if next.is_index() {
        Value::Array(Vec::new())
    } else {
        Value::Object(serde_json::Map::new())
    }
}

/// Write `value` at `path`, creating intermediate containers as needed.
///
/// An empty path replaces the whole document. Missing object members become
/// empty objects or arrays depending on the next key; short arrays are
/// padded the same way while descending, and with nulls at the final index.
/// Addressing through a scalar, or an index into an object, leaves the
/// document untouched.
pub fn write_path(root: &mut Value, path: &DataPath, value: Value) {
    let Some((last, walk)) = path.keys().split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for (i, key) in walk.iter().enumerate() {
        let next = walk.get(i + 1).unwrap_or(last);
        current = match (current, key) {
            (Value::Object(map), PathKey::Key(k)) => {
                map.entry(k.clone()).or_insert_with(|| empty_container(next))
            }
            (Value::Array(seq), PathKey::Index(idx)) => {
                while seq.len() <= *idx {
                    seq.push(empty_container(next));
                }
                &mut seq[*idx]
            }
            (_, key) => {
                debug!(%key, "path write through mismatched container, skipping");
                return;
            }
        };
    }

    match (current, last) {
        (Value::Object(map), PathKey::Key(k)) => {
            map.insert(k.clone(), value);
        }
        (Value::Array(seq), PathKey::Index(idx)) => {
            while seq.len() <= *idx {
                seq.push(Value::Null);
            }
            seq[*idx] = value;
        }
        (_, key) => {
            debug!(%key, "path write into mismatched container, skipping");
        }
    }
}
