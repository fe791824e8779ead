//! File-level commands: entity copy/delete with manifest side effects, and
//! localized-string creation.
//!
//! These operate on the filesystem and a manifest document as one logical
//! unit. `prepare` validates preconditions and snapshots before-state
//! without mutating anything; `apply` stages every file write before
//! committing any of them, so a failure while serializing leaves no
//! partial state behind.

use crate::command::{Command, CommandContext};
use crate::error::{CommandError, Result};
use forge_data::{json, DataPath, Value};
use forge_store::{FileId, ModLayout, UNIFORM_KIND};
use serde_json::json as json_value;
use std::fs;
use tracing::{debug, warn};

/// Append `id` to a manifest's `ids` list, keeping the list sorted.
fn manifest_with_id(manifest: &Value, id: &str) -> Value {
    let mut updated = manifest.clone();
    if let Some(ids) = updated.get_mut("ids").and_then(Value::as_array_mut) {
        if !ids.iter().any(|v| v.as_str() == Some(id)) {
            ids.push(Value::String(id.to_string()));
            ids.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        }
    }
    updated
}

/// Remove `id` from a manifest's `ids` list.
fn manifest_without_id(manifest: &Value, id: &str) -> Value {
    let mut updated = manifest.clone();
    if let Some(ids) = updated.get_mut("ids").and_then(Value::as_array_mut) {
        ids.retain(|v| v.as_str() != Some(id));
    }
    updated
}

fn not_prepared() -> CommandError {
    CommandError::PreconditionFailed("prepare was not called".into())
}

/// Copy an existing entity (from the mod or the base game) to a new id,
/// creating the entity file and appending the id to the kind's manifest.
///
/// The manifest file is the stack-facing target, so pushing this command
/// keeps the stored manifest document, its modified flag and subscribers in
/// step with the disk write. Uniform-kind files have no manifest; for them
/// the created file itself is the target.
pub struct CopyEntityCommand {
    source_id: String,
    kind: String,
    new_id: String,
    overwrite: bool,
    created_file: FileId,
    manifest_file: Option<FileId>,
    target_file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    source_data: Option<Value>,
}

impl CopyEntityCommand {
    pub fn new(
        layout: &ModLayout,
        source_id: impl Into<String>,
        kind: impl Into<String>,
        new_id: impl Into<String>,
        overwrite: bool,
    ) -> Self {
        let kind = kind.into();
        let new_id = new_id.into();
        let created_file = layout.entity_file(&kind, &new_id);
        let manifest_file = layout.manifest_file(&kind);
        let target_file = manifest_file.clone().unwrap_or_else(|| created_file.clone());
        Self {
            source_id: source_id.into(),
            kind,
            new_id,
            overwrite,
            created_file,
            manifest_file,
            target_file,
            path: DataPath::root(),
            old_value: Value::Null,
            new_value: Value::Null,
            source_data: None,
        }
    }

    pub fn created_file(&self) -> &FileId {
        &self.created_file
    }

    pub(crate) fn source_data(&self) -> Option<&Value> {
        self.source_data.as_ref()
    }

    /// Resolve the source, check the target, and snapshot the manifest.
    pub fn prepare(&mut self, ctx: &CommandContext<'_>) -> Result<()> {
        let source_data = if self.kind == UNIFORM_KIND {
            self.read_uniform_source(ctx)?
        } else {
            ctx.registry
                .get(&self.kind, &self.source_id)
                .map(|(data, _)| data.clone())
                .ok_or_else(|| {
                    CommandError::PreconditionFailed(format!(
                        "could not find source {} of kind {}",
                        self.source_id, self.kind
                    ))
                })?
        };

        if self.created_file.as_path().exists() && !self.overwrite {
            return Err(CommandError::PreconditionFailed(format!(
                "target file {} already exists",
                self.created_file
            )));
        }

        if let Some(manifest_file) = &self.manifest_file {
            let manifest = if manifest_file.as_path().exists() {
                json::read_json_file(manifest_file.as_path())?
            } else {
                json_value!({"ids": []})
            };
            self.old_value = manifest.clone();
            self.new_value = if self.overwrite {
                manifest
            } else {
                manifest_with_id(&manifest, &self.new_id)
            };
        } else {
            self.old_value = Value::Null;
            self.new_value = source_data.clone();
        }

        self.source_data = Some(source_data);
        Ok(())
    }

    fn read_uniform_source(&self, ctx: &CommandContext<'_>) -> Result<Value> {
        let mod_file = ctx.layout.entity_file(&self.kind, &self.source_id);
        if mod_file.as_path().exists() {
            return Ok(json::read_json_file(mod_file.as_path())?);
        }
        if let Some(base_file) = ctx.layout.base_entity_file(&self.kind, &self.source_id) {
            if base_file.as_path().exists() {
                return Ok(json::read_json_file(base_file.as_path())?);
            }
        }
        Err(CommandError::PreconditionFailed(format!(
            "could not find source uniforms {}",
            self.source_id
        )))
    }
}

impl Command for CopyEntityCommand {
    fn target_file(&self) -> &FileId {
        &self.target_file
    }

    fn path(&self) -> &DataPath {
        &self.path
    }

    fn old_value(&self) -> &Value {
        &self.old_value
    }

    fn new_value(&self) -> &Value {
        &self.new_value
    }

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let source = self.source_data.clone().ok_or_else(not_prepared)?;
        debug!(source = %self.source_id, target = %self.created_file, "copying entity");

        let mut batch = json::WriteBatch::new();
        batch.stage(self.created_file.as_path(), &source)?;
        if let Some(manifest_file) = &self.manifest_file {
            batch.stage(manifest_file.as_path(), &self.new_value)?;
        }
        batch.commit()?;

        if self.kind != UNIFORM_KIND {
            ctx.registry
                .insert_mod(&self.kind, &self.new_id, source);
        }
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(target = %self.created_file, "undoing entity copy");
        if self.created_file.as_path().exists() {
            fs::remove_file(self.created_file.as_path())?;
        }
        if let Some(manifest_file) = &self.manifest_file {
            json::write_json_file(manifest_file.as_path(), &self.old_value)?;
            ctx.store.set(manifest_file.clone(), self.old_value.clone());
            ctx.store.clear_modified(manifest_file);
        }
        ctx.registry.remove_mod(&self.kind, &self.new_id);
        ctx.store.remove(&self.created_file);
        Ok(())
    }
}

/// Delete an entity file, optionally removing its manifest entry.
pub struct DeleteEntityCommand {
    entity_id: String,
    kind: String,
    remove_manifest: bool,
    entity_file: FileId,
    manifest_file: Option<FileId>,
    manifest_on_disk: bool,
    target_file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    file_data: Option<Value>,
    registry_entry: Option<Value>,
}

impl DeleteEntityCommand {
    pub fn new(
        layout: &ModLayout,
        entity_id: impl Into<String>,
        kind: impl Into<String>,
        remove_manifest: bool,
    ) -> Self {
        let kind = kind.into();
        let entity_id = entity_id.into();
        let entity_file = layout.entity_file(&kind, &entity_id);
        let manifest_file = if remove_manifest {
            layout.manifest_file(&kind)
        } else {
            None
        };
        let target_file = manifest_file.clone().unwrap_or_else(|| entity_file.clone());
        Self {
            entity_id,
            kind,
            remove_manifest,
            entity_file,
            manifest_file,
            manifest_on_disk: false,
            target_file,
            path: DataPath::root(),
            old_value: Value::Null,
            new_value: Value::Null,
            file_data: None,
            registry_entry: None,
        }
    }

    /// Snapshot the file and manifest so the deletion can be undone.
    pub fn prepare(&mut self, ctx: &CommandContext<'_>) -> Result<()> {
        if !self.entity_file.as_path().exists() {
            return Err(CommandError::PreconditionFailed(format!(
                "file does not exist: {}",
                self.entity_file
            )));
        }
        let file_data = json::read_json_file(self.entity_file.as_path())?;

        if let Some(manifest_file) = &self.manifest_file {
            self.manifest_on_disk = manifest_file.as_path().exists();
            let manifest = if self.manifest_on_disk {
                json::read_json_file(manifest_file.as_path())?
            } else {
                json_value!({"ids": []})
            };
            self.old_value = manifest.clone();
            self.new_value = manifest_without_id(&manifest, &self.entity_id);
        } else {
            self.old_value = file_data.clone();
            self.new_value = Value::Null;
        }

        self.registry_entry = ctx.registry.get_mod(&self.kind, &self.entity_id).cloned();
        self.file_data = Some(file_data);
        Ok(())
    }
}

impl Command for DeleteEntityCommand {
    fn target_file(&self) -> &FileId {
        &self.target_file
    }

    fn path(&self) -> &DataPath {
        &self.path
    }

    fn old_value(&self) -> &Value {
        &self.old_value
    }

    fn new_value(&self) -> &Value {
        &self.new_value
    }

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        if self.file_data.is_none() {
            return Err(not_prepared());
        }
        debug!(file = %self.entity_file, "deleting entity file");

        if self.entity_file.as_path().exists() {
            fs::remove_file(self.entity_file.as_path())?;
        }
        if self.remove_manifest && self.manifest_on_disk {
            if let Some(manifest_file) = &self.manifest_file {
                json::write_json_file(manifest_file.as_path(), &self.new_value)?;
            }
        }
        ctx.registry.remove_mod(&self.kind, &self.entity_id);
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let file_data = self.file_data.clone().ok_or_else(not_prepared)?;
        debug!(file = %self.entity_file, "restoring deleted entity file");

        json::write_json_file(self.entity_file.as_path(), &file_data)?;
        if self.remove_manifest && self.manifest_on_disk {
            if let Some(manifest_file) = &self.manifest_file {
                json::write_json_file(manifest_file.as_path(), &self.old_value)?;
            }
        }
        if let Some(entry) = &self.registry_entry {
            ctx.registry
                .insert_mod(&self.kind, &self.entity_id, entry.clone());
        }
        Ok(())
    }
}

/// Create a localized-string entry in one language's text file.
///
/// The transition is a whole-document replace of the per-language file; the
/// disk write happens on save. The in-memory [`StringCatalog`] mirror is
/// kept consistent by apply/revert.
///
/// [`StringCatalog`]: forge_store::StringCatalog
pub struct CreateLocalizedTextCommand {
    file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    key: String,
    text: String,
    language: String,
}

impl CreateLocalizedTextCommand {
    pub fn new(
        layout: &ModLayout,
        key: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let text = text.into();
        let language = language.into();
        let file = layout.localized_file(&language);

        // A missing or unreadable file reads as an empty catalog.
        let old_value = match json::read_json_file(file.as_path()) {
            Ok(value) => value,
            Err(error) => {
                warn!(%file, %error, "no usable localized text file, starting empty");
                json_value!({})
            }
        };
        let mut new_value = old_value.clone();
        if let Value::Object(map) = &mut new_value {
            map.insert(key.clone(), Value::String(text.clone()));
        }

        Self {
            file,
            path: DataPath::root(),
            old_value,
            new_value,
            key,
            text,
            language,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Command for CreateLocalizedTextCommand {
    fn target_file(&self) -> &FileId {
        &self.file
    }

    fn path(&self) -> &DataPath {
        &self.path
    }

    fn old_value(&self) -> &Value {
        &self.old_value
    }

    fn new_value(&self) -> &Value {
        &self.new_value
    }

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(language = %self.language, key = %self.key, "creating localized string");
        ctx.strings.insert(&*self.language, &*self.key, &*self.text);
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(language = %self.language, key = %self.key, "removing localized string");
        ctx.strings.remove(&self.language, &self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::CommandStack;
    use serde_json::json;

    fn workspace() -> (tempfile::TempDir, CommandStack) {
        let dir = tempfile::tempdir().unwrap();
        let stack = CommandStack::new(ModLayout::new(dir.path()));
        (dir, stack)
    }

    #[test]
    fn test_copy_requires_known_source() {
        let (_dir, mut stack) = workspace();
        let layout = stack.layout().clone();
        let mut command = CopyEntityCommand::new(&layout, "ghost", "unit", "ghost_mk2", false);

        assert!(matches!(
            command.prepare(&stack.context()),
            Err(CommandError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_copy_refuses_existing_target_without_overwrite() {
        let (_dir, mut stack) = workspace();
        let layout = stack.layout().clone();
        stack
            .registry_mut()
            .insert_mod("unit", "scout", json!({"hull": 450}));
        json::write_json_file(
            layout.entity_file("unit", "scout_mk2").as_path(),
            &json!({}),
        )
        .unwrap();

        let mut command = CopyEntityCommand::new(&layout, "scout", "unit", "scout_mk2", false);
        assert!(matches!(
            command.prepare(&stack.context()),
            Err(CommandError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_copy_appends_sorted_manifest_id() {
        let (_dir, mut stack) = workspace();
        let layout = stack.layout().clone();
        stack
            .registry_mut()
            .insert_mod("unit", "scout", json!({"hull": 450}));
        let manifest_file = layout.manifest_file("unit").unwrap();
        json::write_json_file(manifest_file.as_path(), &json!({"ids": ["scout", "zephyr"]}))
            .unwrap();

        let mut command = CopyEntityCommand::new(&layout, "scout", "unit", "anchor", false);
        command.prepare(&stack.context()).unwrap();

        assert_eq!(
            command.new_value(),
            &json!({"ids": ["anchor", "scout", "zephyr"]})
        );
        assert_eq!(command.old_value(), &json!({"ids": ["scout", "zephyr"]}));
    }

    #[test]
    fn test_apply_writes_entity_and_manifest_then_revert_restores() {
        let (_dir, mut stack) = workspace();
        let layout = stack.layout().clone();
        stack
            .registry_mut()
            .insert_mod("unit", "scout", json!({"hull": 450}));
        let manifest_file = layout.manifest_file("unit").unwrap();
        json::write_json_file(manifest_file.as_path(), &json!({"ids": ["scout"]})).unwrap();
        let manifest_before = fs::read(manifest_file.as_path()).unwrap();

        let mut command = CopyEntityCommand::new(&layout, "scout", "unit", "scout_mk2", false);
        command.prepare(&stack.context()).unwrap();

        let mut ctx = stack.context();
        command.apply(&mut ctx).unwrap();

        let created = layout.entity_file("unit", "scout_mk2");
        assert_eq!(
            json::read_json_file(created.as_path()).unwrap(),
            json!({"hull": 450})
        );
        assert_eq!(
            json::read_json_file(manifest_file.as_path()).unwrap(),
            json!({"ids": ["scout", "scout_mk2"]})
        );
        assert!(ctx.registry.contains_mod("unit", "scout_mk2"));

        command.revert(&mut ctx).unwrap();
        assert!(!created.as_path().exists());
        assert_eq!(fs::read(manifest_file.as_path()).unwrap(), manifest_before);
        assert!(!ctx.registry.contains_mod("unit", "scout_mk2"));
    }

    #[test]
    fn test_delete_roundtrip_restores_file_and_manifest() {
        let (_dir, mut stack) = workspace();
        let layout = stack.layout().clone();
        let entity_file = layout.entity_file("unit", "scout");
        let manifest_file = layout.manifest_file("unit").unwrap();
        json::write_json_file(entity_file.as_path(), &json!({"hull": 450})).unwrap();
        json::write_json_file(manifest_file.as_path(), &json!({"ids": ["scout"]})).unwrap();
        stack
            .registry_mut()
            .insert_mod("unit", "scout", json!({"hull": 450}));

        let mut command = DeleteEntityCommand::new(&layout, "scout", "unit", true);
        command.prepare(&stack.context()).unwrap();

        let mut ctx = stack.context();
        command.apply(&mut ctx).unwrap();
        assert!(!entity_file.as_path().exists());
        assert_eq!(
            json::read_json_file(manifest_file.as_path()).unwrap(),
            json!({"ids": []})
        );
        assert!(!ctx.registry.contains_mod("unit", "scout"));

        command.revert(&mut ctx).unwrap();
        assert_eq!(
            json::read_json_file(entity_file.as_path()).unwrap(),
            json!({"hull": 450})
        );
        assert_eq!(
            json::read_json_file(manifest_file.as_path()).unwrap(),
            json!({"ids": ["scout"]})
        );
        assert!(ctx.registry.contains_mod("unit", "scout"));
    }

    #[test]
    fn test_delete_missing_file_fails_in_prepare() {
        let (_dir, mut stack) = workspace();
        let layout = stack.layout().clone();
        let mut command = DeleteEntityCommand::new(&layout, "ghost", "unit", false);

        assert!(matches!(
            command.prepare(&stack.context()),
            Err(CommandError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_localized_text_builds_on_existing_file() {
        let (_dir, stack) = workspace();
        let layout = stack.layout().clone();
        let file = layout.localized_file("en");
        json::write_json_file(file.as_path(), &json!({"existing": "Old"})).unwrap();

        let command = CreateLocalizedTextCommand::new(&layout, "scout_name", "Scout", "en");
        assert_eq!(
            command.new_value(),
            &json!({"existing": "Old", "scout_name": "Scout"})
        );
    }

    #[test]
    fn test_localized_text_starts_empty_without_file() {
        let (_dir, mut stack) = workspace();
        let layout = stack.layout().clone();

        let mut command = CreateLocalizedTextCommand::new(&layout, "scout_name", "Scout", "en");
        assert_eq!(command.old_value(), &json!({}));
        assert_eq!(command.new_value(), &json!({"scout_name": "Scout"}));

        let mut ctx = stack.context();
        command.apply(&mut ctx).unwrap();
        assert_eq!(ctx.strings.get("en", "scout_name"), Some("Scout"));

        command.revert(&mut ctx).unwrap();
        assert!(!ctx.strings.contains("en", "scout_name"));
    }
}
