//! The undo/redo engine.
//!
//! Owns the document store, the change notifier and the workspace
//! registries, and sequences every command through the same pipeline:
//! execute, write the command's value at its path into the stored
//! document, notify subscribers, record history, mark the file modified.

use crate::command::{Command, CommandContext};
use crate::error::{CommandError, Result};
use crate::schema::{NullSchemaProvider, SchemaProvider};
use forge_data::{write_path, DataPath, Value};
use forge_store::{
    ChangeNotifier, DocumentStore, EntityRegistry, FileId, ModLayout, StringCatalog,
};
use tracing::{debug, warn};

/// Linear undo/redo history over a [`DocumentStore`].
pub struct CommandStack {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    /// Re-entrancy guard: a command's apply/revert must not push again.
    is_executing: bool,
    store: DocumentStore,
    notifier: ChangeNotifier,
    registry: EntityRegistry,
    strings: StringCatalog,
    layout: ModLayout,
    schemas: Box<dyn SchemaProvider>,
}

impl CommandStack {
    /// New stack over a mod workspace, with no schema knowledge.
    pub fn new(layout: ModLayout) -> Self {
        Self::with_schemas(layout, Box::new(NullSchemaProvider))
    }

    pub fn with_schemas(layout: ModLayout, schemas: Box<dyn SchemaProvider>) -> Self {
        debug!("initialized new command stack");
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            is_executing: false,
            store: DocumentStore::new(),
            notifier: ChangeNotifier::new(),
            registry: EntityRegistry::new(),
            strings: StringCatalog::new(),
            layout,
            schemas,
        }
    }

    // === State access ===

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut ChangeNotifier {
        &mut self.notifier
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn strings(&self) -> &StringCatalog {
        &self.strings
    }

    pub fn layout(&self) -> &ModLayout {
        &self.layout
    }

    pub fn schemas(&self) -> &dyn SchemaProvider {
        self.schemas.as_ref()
    }

    /// Borrow the engine state as a [`CommandContext`], e.g. for `prepare`
    /// calls that run before a command is pushed.
    pub fn context(&mut self) -> CommandContext<'_> {
        CommandContext {
            store: &mut self.store,
            notifier: &mut self.notifier,
            registry: &mut self.registry,
            strings: &mut self.strings,
            layout: &self.layout,
            schemas: self.schemas.as_ref(),
        }
    }

    // === History ===

    /// Execute a command and record it for undo.
    ///
    /// A push while another command is executing is a logged no-op. A
    /// missing stored document is tolerated only for whole-document
    /// commands (the root write defines the document); path-scoped
    /// commands against an unknown document fail before anything runs.
    /// An apply error propagates before the command is recorded.
    pub fn push(&mut self, mut command: Box<dyn Command>) -> Result<()> {
        if self.is_executing {
            debug!("skipping push, already executing");
            return Ok(());
        }
        let file = command.target_file().clone();
        let path = command.path().clone();
        if !self.store.contains(&file) && !path.is_root() {
            warn!(%file, %path, "no document loaded for pushed command");
            return Err(CommandError::DocumentNotLoaded(file.to_string()));
        }
        debug!(%file, %path, "pushing command");

        self.is_executing = true;
        let result = {
            let mut ctx = self.context();
            command.apply(&mut ctx)
        };
        self.is_executing = false;
        result?;

        self.write_through(&file, &path, command.new_value().clone(), command.as_ref());
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.store.mark_modified(&file);
        Ok(())
    }

    /// Revert the most recent command.
    ///
    /// The command moves to the redo list even when its revert reports an
    /// error; the stack sequences history, it does not compensate.
    pub fn undo(&mut self) -> Result<()> {
        let Some(mut command) = self.undo_stack.pop() else {
            debug!("nothing to undo");
            return Ok(());
        };
        let file = command.target_file().clone();
        let path = command.path().clone();
        debug!(%file, %path, "undoing command");

        self.is_executing = true;
        let result = {
            let mut ctx = self.context();
            command.revert(&mut ctx)
        };
        self.is_executing = false;

        if self.store.contains(&file) {
            self.write_through(&file, &path, command.old_value().clone(), command.as_ref());
            self.store.mark_modified(&file);
        }
        self.redo_stack.push(command);
        result
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self) -> Result<()> {
        let Some(mut command) = self.redo_stack.pop() else {
            debug!("nothing to redo");
            return Ok(());
        };
        let file = command.target_file().clone();
        let path = command.path().clone();
        debug!(%file, %path, "redoing command");

        self.is_executing = true;
        let result = {
            let mut ctx = self.context();
            command.apply(&mut ctx)
        };
        self.is_executing = false;

        if self.store.contains(&file) {
            self.write_through(&file, &path, command.new_value().clone(), command.as_ref());
            self.store.mark_modified(&file);
        }
        self.undo_stack.push(command);
        result
    }

    /// Path-write `value` into the stored document and notify subscribers.
    fn write_through(&mut self, file: &FileId, path: &DataPath, value: Value, command: &dyn Command) {
        let mut document = self.store.get(file).unwrap_or(Value::Null);
        write_path(&mut document, path, value.clone());
        self.store.set(file.clone(), document.clone());
        self.notifier
            .notify_partial(file, &document, path, &value, command.origin());
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // === Saving ===

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.has_unsaved_changes()
    }

    pub fn modified_files(&self) -> Vec<FileId> {
        self.store.modified_files()
    }

    pub fn mark_all_saved(&mut self) {
        self.store.mark_all_saved();
    }

    /// Save one file's stored document to disk. See [`DocumentStore::save`].
    pub fn save_file(&mut self, file: &FileId) -> Result<bool> {
        Ok(self.store.save(file)?)
    }

    /// Forget a file's unsaved-changes flag without saving.
    pub fn clear_modified_state(&mut self, file: &FileId) {
        self.store.clear_modified(file);
    }
}
