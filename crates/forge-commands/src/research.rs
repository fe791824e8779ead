//! Research-tree commands: creating and deleting research subjects.
//!
//! A research subject is two things at once: an entity file (with a
//! manifest entry) and an id inside one of the player file's research
//! arrays. Both sides change together and are undone together.

use crate::command::{Command, CommandContext, DataUpdateFn};
use crate::error::{CommandError, Result};
use crate::file::CopyEntityCommand;
use forge_data::{json, read_path, write_path, DataPath, Value};
use forge_store::{FileId, ModLayout};
use serde_json::json as json_value;
use std::fs;
use tracing::debug;

/// Entity kind of research subject files.
pub const RESEARCH_SUBJECT_KIND: &str = "research_subject";

/// Which of the player file's research arrays a subject belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubjectScope {
    Regular,
    Faction,
}

impl SubjectScope {
    /// Path of the scope's id array within the player file.
    pub fn array_path(&self) -> DataPath {
        match self {
            SubjectScope::Regular => DataPath::parse("research.research_subjects"),
            SubjectScope::Faction => DataPath::parse("research.faction_research_subjects"),
        }
    }
}

/// Placement overrides applied to a newly created subject file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubjectSettings {
    pub domain: Option<String>,
    pub field: Option<String>,
    pub tier: Option<i64>,
    pub field_coord: Option<(i64, i64)>,
}

impl SubjectSettings {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.field.is_none()
            && self.tier.is_none()
            && self.field_coord.is_none()
    }

    fn apply_to(&self, subject: &mut Value) {
        let Value::Object(map) = subject else {
            return;
        };
        if let Some(domain) = &self.domain {
            map.insert("domain".into(), json_value!(domain));
        }
        if let Some(field) = &self.field {
            map.insert("field".into(), json_value!(field));
        }
        if let Some(tier) = self.tier {
            map.insert("tier".into(), json_value!(tier));
        }
        if let Some((x, y)) = self.field_coord {
            map.insert("field_coord".into(), json_value!([x, y]));
        }
    }
}

/// Copy an existing subject to a new id and add it to the research tree.
///
/// The player file is the stack-facing target; old/new values are whole
/// player documents, before and after the id lands in the research array.
pub struct CreateResearchSubjectCommand {
    player_file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    new_id: String,
    scope: SubjectScope,
    settings: SubjectSettings,
    array_path: DataPath,
    copy: CopyEntityCommand,
    subject_file: FileId,
    subject_data: Option<Value>,
    update_data: Option<DataUpdateFn>,
    prepared: bool,
}

impl CreateResearchSubjectCommand {
    pub fn new(
        layout: &ModLayout,
        player_file: FileId,
        source_id: impl Into<String>,
        new_id: impl Into<String>,
        scope: SubjectScope,
        overwrite: bool,
    ) -> Self {
        let new_id = new_id.into();
        let copy = CopyEntityCommand::new(
            layout,
            source_id,
            RESEARCH_SUBJECT_KIND,
            new_id.clone(),
            overwrite,
        );
        let subject_file = layout.entity_file(RESEARCH_SUBJECT_KIND, &new_id);
        Self {
            player_file,
            path: DataPath::root(),
            old_value: Value::Null,
            new_value: Value::Null,
            new_id,
            scope,
            settings: SubjectSettings::default(),
            array_path: scope.array_path(),
            copy,
            subject_file,
            subject_data: None,
            update_data: None,
            prepared: false,
        }
    }

    pub fn with_settings(mut self, settings: SubjectSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_data_update(mut self, callback: DataUpdateFn) -> Self {
        self.update_data = Some(callback);
        self
    }

    pub fn scope(&self) -> SubjectScope {
        self.scope
    }

    /// Snapshot the player document, stage the research-array append, and
    /// prepare the underlying entity copy.
    pub fn prepare(&mut self, ctx: &CommandContext<'_>) -> Result<()> {
        let data = ctx
            .store
            .get(&self.player_file)
            .ok_or_else(|| CommandError::DocumentNotLoaded(self.player_file.to_string()))?;
        if data.get("research").is_none() {
            return Err(CommandError::PreconditionFailed(
                "player file has no research data".into(),
            ));
        }

        let mut old_document = data.clone();
        let mut new_document = data;
        // An absent array counts as empty in both snapshots.
        if read_path(&old_document, &self.array_path).is_none() {
            write_path(&mut old_document, &self.array_path, json_value!([]));
            write_path(&mut new_document, &self.array_path, json_value!([]));
        }
        let mut array = read_path(&new_document, &self.array_path)
            .cloned()
            .unwrap_or_else(|| json_value!([]));
        if let Value::Array(ids) = &mut array {
            ids.push(Value::String(self.new_id.clone()));
        }
        write_path(&mut new_document, &self.array_path, array);

        self.copy.prepare(ctx)?;

        if !self.settings.is_empty() {
            let mut subject = self
                .copy
                .source_data()
                .cloned()
                .ok_or_else(|| {
                    CommandError::PreconditionFailed("entity copy was not prepared".into())
                })?;
            self.settings.apply_to(&mut subject);
            self.subject_data = Some(subject);
        }

        self.old_value = old_document;
        self.new_value = new_document;
        self.prepared = true;
        Ok(())
    }

    fn push_array_update(&mut self, document: &Value) {
        if let (Some(callback), Some(array)) =
            (&mut self.update_data, read_path(document, &self.array_path))
        {
            callback(&self.array_path, array);
        }
    }
}

impl Command for CreateResearchSubjectCommand {
    fn target_file(&self) -> &FileId {
        &self.player_file
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
        if !self.prepared {
            return Err(CommandError::PreconditionFailed(
                "prepare was not called".into(),
            ));
        }
        debug!(subject = %self.new_id, "creating research subject");

        self.copy.apply(ctx)?;
        if let Some(subject) = &self.subject_data {
            json::write_json_file(self.subject_file.as_path(), subject)?;
            ctx.registry
                .insert_mod(RESEARCH_SUBJECT_KIND, &self.new_id, subject.clone());
        }

        ctx.store
            .set(self.player_file.clone(), self.new_value.clone());
        ctx.store.mark_modified(&self.player_file);
        let document = self.new_value.clone();
        self.push_array_update(&document);
        ctx.refresh_view(&self.player_file);
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(subject = %self.new_id, "undoing research subject creation");

        self.copy.revert(ctx)?;
        ctx.store
            .set(self.player_file.clone(), self.old_value.clone());
        ctx.store.mark_modified(&self.player_file);
        let document = self.old_value.clone();
        self.push_array_update(&document);
        ctx.refresh_view(&self.player_file);
        Ok(())
    }
}

/// Remove a subject from the research tree, optionally deleting its file
/// and manifest entry as well.
pub struct DeleteResearchSubjectCommand {
    player_file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    subject_id: String,
    array_path: DataPath,
    full_delete: bool,
    subject_file: FileId,
    manifest_file: Option<FileId>,
    subject_data: Option<Value>,
    manifest_data: Option<Value>,
    registry_entry: Option<Value>,
    update_data: Option<DataUpdateFn>,
    prepared: bool,
}

impl DeleteResearchSubjectCommand {
    pub fn new(
        layout: &ModLayout,
        player_file: FileId,
        subject_id: impl Into<String>,
        scope: SubjectScope,
        full_delete: bool,
    ) -> Self {
        let subject_id = subject_id.into();
        let subject_file = layout.entity_file(RESEARCH_SUBJECT_KIND, &subject_id);
        let manifest_file = layout.manifest_file(RESEARCH_SUBJECT_KIND);
        Self {
            player_file,
            path: DataPath::root(),
            old_value: Value::Null,
            new_value: Value::Null,
            subject_id,
            array_path: scope.array_path(),
            full_delete,
            subject_file,
            manifest_file,
            subject_data: None,
            manifest_data: None,
            registry_entry: None,
            update_data: None,
            prepared: false,
        }
    }

    pub fn on_data_update(mut self, callback: DataUpdateFn) -> Self {
        self.update_data = Some(callback);
        self
    }

    /// Snapshot the player document, the subject file and the manifest.
    pub fn prepare(&mut self, ctx: &CommandContext<'_>) -> Result<()> {
        let data = ctx
            .store
            .get(&self.player_file)
            .ok_or_else(|| CommandError::DocumentNotLoaded(self.player_file.to_string()))?;
        if data.get("research").is_none() {
            return Err(CommandError::PreconditionFailed(
                "player file has no research data".into(),
            ));
        }

        let old_document = data.clone();
        let mut new_document = data;
        let Some(array) = read_path(&new_document, &self.array_path).cloned() else {
            return Err(CommandError::PreconditionFailed(format!(
                "research array {} not found",
                self.array_path
            )));
        };
        let Value::Array(ids) = array else {
            return Err(CommandError::PreconditionFailed(format!(
                "research array {} is not an array",
                self.array_path
            )));
        };
        if !ids.iter().any(|v| v.as_str() == Some(self.subject_id.as_str())) {
            return Err(CommandError::PreconditionFailed(format!(
                "subject {} not found in research array",
                self.subject_id
            )));
        }
        let remaining: Vec<Value> = ids
            .into_iter()
            .filter(|v| v.as_str() != Some(self.subject_id.as_str()))
            .collect();
        write_path(&mut new_document, &self.array_path, Value::Array(remaining));

        if self.full_delete {
            if self.subject_file.as_path().exists() {
                self.subject_data = Some(json::read_json_file(self.subject_file.as_path())?);
            }
            if let Some(manifest_file) = &self.manifest_file {
                if manifest_file.as_path().exists() {
                    self.manifest_data = Some(json::read_json_file(manifest_file.as_path())?);
                }
            }
            self.registry_entry = ctx
                .registry
                .get_mod(RESEARCH_SUBJECT_KIND, &self.subject_id)
                .cloned();
        }

        self.old_value = old_document;
        self.new_value = new_document;
        self.prepared = true;
        Ok(())
    }

    fn push_array_update(&mut self, document: &Value) {
        if let (Some(callback), Some(array)) =
            (&mut self.update_data, read_path(document, &self.array_path))
        {
            callback(&self.array_path, array);
        }
    }
}

impl Command for DeleteResearchSubjectCommand {
    fn target_file(&self) -> &FileId {
        &self.player_file
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
        if !self.prepared {
            return Err(CommandError::PreconditionFailed(
                "prepare was not called".into(),
            ));
        }
        debug!(subject = %self.subject_id, full_delete = self.full_delete, "deleting research subject");

        ctx.store
            .set(self.player_file.clone(), self.new_value.clone());
        ctx.store.mark_modified(&self.player_file);

        if self.full_delete {
            if self.subject_file.as_path().exists() {
                fs::remove_file(self.subject_file.as_path())?;
            }
            if let (Some(manifest_file), Some(manifest)) =
                (&self.manifest_file, &self.manifest_data)
            {
                let mut updated = manifest.clone();
                if let Some(ids) = updated.get_mut("ids").and_then(Value::as_array_mut) {
                    ids.retain(|v| v.as_str() != Some(self.subject_id.as_str()));
                }
                json::write_json_file(manifest_file.as_path(), &updated)?;
                ctx.store.set(manifest_file.clone(), updated);
                ctx.store.mark_modified(manifest_file);
            }
            ctx.registry
                .remove_mod(RESEARCH_SUBJECT_KIND, &self.subject_id);
        }

        let document = self.new_value.clone();
        self.push_array_update(&document);
        ctx.refresh_view(&self.player_file);
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(subject = %self.subject_id, "restoring research subject");

        ctx.store
            .set(self.player_file.clone(), self.old_value.clone());
        ctx.store.mark_modified(&self.player_file);

        if self.full_delete {
            if let Some(subject) = &self.subject_data {
                json::write_json_file(self.subject_file.as_path(), subject)?;
            }
            if let (Some(manifest_file), Some(manifest)) =
                (&self.manifest_file, &self.manifest_data)
            {
                json::write_json_file(manifest_file.as_path(), manifest)?;
                ctx.store.set(manifest_file.clone(), manifest.clone());
                ctx.store.mark_modified(manifest_file);
            }
            if let Some(entry) = &self.registry_entry {
                ctx.registry
                    .insert_mod(RESEARCH_SUBJECT_KIND, &self.subject_id, entry.clone());
            }
        }

        let document = self.old_value.clone();
        self.push_array_update(&document);
        ctx.refresh_view(&self.player_file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::CommandStack;
    use serde_json::json;

    fn workspace() -> (tempfile::TempDir, CommandStack, FileId) {
        let dir = tempfile::tempdir().unwrap();
        let mut stack = CommandStack::new(ModLayout::new(dir.path()));
        let player_file = FileId::from(dir.path().join("player.player"));
        stack.store_mut().set(
            player_file.clone(),
            json!({"research": {"research_subjects": ["alpha"]}}),
        );
        stack
            .registry_mut()
            .insert_mod(RESEARCH_SUBJECT_KIND, "alpha", json!({"tier": 1}));
        (dir, stack, player_file)
    }

    #[test]
    fn test_create_appends_id_and_copies_file() {
        let (_dir, mut stack, player_file) = workspace();
        let layout = stack.layout().clone();

        let mut command = CreateResearchSubjectCommand::new(
            &layout,
            player_file.clone(),
            "alpha",
            "beta",
            SubjectScope::Regular,
            false,
        )
        .with_settings(SubjectSettings {
            tier: Some(3),
            field_coord: Some((2, 4)),
            ..Default::default()
        });
        command.prepare(&stack.context()).unwrap();

        assert_eq!(
            read_path(command.new_value(), &DataPath::parse("research.research_subjects")),
            Some(&json!(["alpha", "beta"]))
        );

        let mut ctx = stack.context();
        command.apply(&mut ctx).unwrap();

        let subject_file = layout.entity_file(RESEARCH_SUBJECT_KIND, "beta");
        assert_eq!(
            json::read_json_file(subject_file.as_path()).unwrap(),
            json!({"tier": 3, "field_coord": [2, 4]})
        );
        assert!(ctx.registry.contains_mod(RESEARCH_SUBJECT_KIND, "beta"));
        assert!(ctx.store.is_modified(&player_file));
    }

    #[test]
    fn test_create_then_revert_restores_everything() {
        let (_dir, mut stack, player_file) = workspace();
        let layout = stack.layout().clone();

        let mut command = CreateResearchSubjectCommand::new(
            &layout,
            player_file.clone(),
            "alpha",
            "beta",
            SubjectScope::Regular,
            false,
        );
        command.prepare(&stack.context()).unwrap();

        let mut ctx = stack.context();
        command.apply(&mut ctx).unwrap();
        command.revert(&mut ctx).unwrap();

        let subject_file = layout.entity_file(RESEARCH_SUBJECT_KIND, "beta");
        assert!(!subject_file.as_path().exists());
        assert!(!ctx.registry.contains_mod(RESEARCH_SUBJECT_KIND, "beta"));
        assert_eq!(
            ctx.store.get(&player_file).unwrap(),
            json!({"research": {"research_subjects": ["alpha"]}})
        );
    }

    #[test]
    fn test_create_initializes_missing_faction_array() {
        let (_dir, mut stack, player_file) = workspace();
        let layout = stack.layout().clone();

        let mut command = CreateResearchSubjectCommand::new(
            &layout,
            player_file,
            "alpha",
            "beta",
            SubjectScope::Faction,
            false,
        );
        command.prepare(&stack.context()).unwrap();

        assert_eq!(
            read_path(
                command.new_value(),
                &DataPath::parse("research.faction_research_subjects")
            ),
            Some(&json!(["beta"]))
        );
    }

    #[test]
    fn test_delete_requires_listed_subject() {
        let (_dir, mut stack, player_file) = workspace();
        let layout = stack.layout().clone();

        let mut command = DeleteResearchSubjectCommand::new(
            &layout,
            player_file,
            "ghost",
            SubjectScope::Regular,
            false,
        );
        assert!(matches!(
            command.prepare(&stack.context()),
            Err(CommandError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_full_delete_roundtrip() {
        let (_dir, mut stack, player_file) = workspace();
        let layout = stack.layout().clone();
        let subject_file = layout.entity_file(RESEARCH_SUBJECT_KIND, "alpha");
        let manifest_file = layout.manifest_file(RESEARCH_SUBJECT_KIND).unwrap();
        json::write_json_file(subject_file.as_path(), &json!({"tier": 1})).unwrap();
        json::write_json_file(manifest_file.as_path(), &json!({"ids": ["alpha"]})).unwrap();

        let mut command = DeleteResearchSubjectCommand::new(
            &layout,
            player_file.clone(),
            "alpha",
            SubjectScope::Regular,
            true,
        );
        command.prepare(&stack.context()).unwrap();

        let mut ctx = stack.context();
        command.apply(&mut ctx).unwrap();
        assert!(!subject_file.as_path().exists());
        assert_eq!(
            json::read_json_file(manifest_file.as_path()).unwrap(),
            json!({"ids": []})
        );
        assert_eq!(
            read_path(
                &ctx.store.get(&player_file).unwrap(),
                &DataPath::parse("research.research_subjects")
            ),
            Some(&json!([]))
        );

        command.revert(&mut ctx).unwrap();
        assert_eq!(
            json::read_json_file(subject_file.as_path()).unwrap(),
            json!({"tier": 1})
        );
        assert_eq!(
            json::read_json_file(manifest_file.as_path()).unwrap(),
            json!({"ids": ["alpha"]})
        );
        assert!(ctx.registry.contains_mod(RESEARCH_SUBJECT_KIND, "alpha"));
        assert_eq!(
            read_path(
                &ctx.store.get(&player_file).unwrap(),
                &DataPath::parse("research.research_subjects")
            ),
            Some(&json!(["alpha"]))
        );
    }
}
