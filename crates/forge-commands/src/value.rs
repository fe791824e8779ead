//! Path-addressed value edits.

use crate::command::{update_widget_safely, Command, CommandContext, DataUpdateFn, WidgetUpdateFn};
use crate::error::Result;
use forge_data::{DataPath, Value};
use forge_store::{ActorId, FileId};
use tracing::debug;

/// Replace the value at one path with another.
///
/// Carries optional callbacks: a widget update (best-effort, a vanished
/// target is logged and skipped) and a data update that keeps the editor's
/// live-view mirror consistent. The stack performs the store write and
/// notification after `apply`/`revert`.
pub struct EditValueCommand {
    file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    origin: Option<ActorId>,
    update_widget: Option<WidgetUpdateFn>,
    update_data: Option<DataUpdateFn>,
}

impl EditValueCommand {
    pub fn new(file: FileId, path: DataPath, old_value: Value, new_value: Value) -> Self {
        Self {
            file,
            path,
            old_value,
            new_value,
            origin: None,
            update_widget: None,
            update_data: None,
        }
    }

    pub fn with_origin(mut self, origin: ActorId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn on_widget_update(mut self, callback: WidgetUpdateFn) -> Self {
        self.update_widget = Some(callback);
        self
    }

    pub fn on_data_update(mut self, callback: DataUpdateFn) -> Self {
        self.update_data = Some(callback);
        self
    }
}

impl Command for EditValueCommand {
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

    fn origin(&self) -> Option<&ActorId> {
        self.origin.as_ref()
    }

    fn apply(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.path, "applying value edit");
        update_widget_safely(&mut self.update_widget, &self.new_value);
        if let Some(callback) = &mut self.update_data {
            callback(&self.path, &self.new_value);
        }
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.path, "reverting value edit");
        update_widget_safely(&mut self.update_widget, &self.old_value);
        if let Some(callback) = &mut self.update_data {
            callback(&self.path, &self.old_value);
        }
        Ok(())
    }
}
