//! Mod workspace layout - where entity, manifest, uniforms and localized
//! text files live on disk.

use crate::store::FileId;
use std::path::{Path, PathBuf};

/// Uniforms live outside the entities folder and carry no manifest.
pub const UNIFORM_KIND: &str = "uniform";

/// Directory and extension conventions for a mod folder, with an optional
/// base-game folder for read-only lookups.
#[derive(Clone, Debug)]
pub struct ModLayout {
    mod_root: PathBuf,
    base_root: Option<PathBuf>,
}

impl ModLayout {
    pub fn new(mod_root: impl Into<PathBuf>) -> Self {
        Self {
            mod_root: mod_root.into(),
            base_root: None,
        }
    }

    pub fn with_base(mod_root: impl Into<PathBuf>, base_root: impl Into<PathBuf>) -> Self {
        Self {
            mod_root: mod_root.into(),
            base_root: Some(base_root.into()),
        }
    }

    pub fn mod_root(&self) -> &Path {
        &self.mod_root
    }

    pub fn base_root(&self) -> Option<&Path> {
        self.base_root.as_deref()
    }

    /// Path of an entity file of `kind` in the mod tree.
    pub fn entity_file(&self, kind: &str, id: &str) -> FileId {
        FileId::from(Self::entity_path(&self.mod_root, kind, id))
    }

    /// Same file in the base-game tree, when one is configured.
    pub fn base_entity_file(&self, kind: &str, id: &str) -> Option<FileId> {
        self.base_root
            .as_deref()
            .map(|root| FileId::from(Self::entity_path(root, kind, id)))
    }

    /// Manifest file for one entity kind; uniforms have none.
    pub fn manifest_file(&self, kind: &str) -> Option<FileId> {
        if kind == UNIFORM_KIND {
            return None;
        }
        Some(FileId::from(
            self.mod_root
                .join("entities")
                .join(format!("{}.entity_manifest", kind)),
        ))
    }

    /// Localized text file for one language.
    pub fn localized_file(&self, language: &str) -> FileId {
        FileId::from(
            self.mod_root
                .join("localized_text")
                .join(format!("{}.localized_text", language)),
        )
    }

    fn entity_path(root: &Path, kind: &str, id: &str) -> PathBuf {
        if kind == UNIFORM_KIND {
            root.join("uniforms").join(format!("{}.uniforms", id))
        } else {
            root.join("entities").join(format!("{}.{}", id, kind))
        }
    }
}
