//! Structural add/remove of object members.
//!
//! Old and new values are the entire containing object (the whole document
//! for root-level members), so undo restores member order and content in a
//! single replace. Root-level changes additionally rebuild the whole view:
//! the set of displayable members changed, not just one value.
//!
//! Deleting a member listed in the parent schema's `required` array is
//! refused at the caller layer (see [`crate::schema::is_required`]); these
//! commands assume that check already happened.

use crate::command::{Command, CommandContext, DataUpdateFn};
use crate::error::Result;
use forge_data::{DataPath, Value};
use forge_store::{ActorId, FileId};
use tracing::debug;

/// Add a member to an object.
pub struct AddPropertyCommand {
    file: FileId,
    parent_path: DataPath,
    property: String,
    old_object: Value,
    new_object: Value,
    origin: Option<ActorId>,
    update_data: Option<DataUpdateFn>,
}

impl AddPropertyCommand {
    /// `object_before` is the containing object prior to the change; the
    /// new member is appended, matching how a defaulted property lands at
    /// the end of its object.
    pub fn new(
        file: FileId,
        parent_path: DataPath,
        property: impl Into<String>,
        object_before: Value,
        member_value: Value,
    ) -> Self {
        let property = property.into();
        let mut new_object = object_before.clone();
        if let Value::Object(map) = &mut new_object {
            map.insert(property.clone(), member_value);
        }
        Self {
            file,
            parent_path,
            property,
            old_object: object_before,
            new_object,
            origin: None,
            update_data: None,
        }
    }

    pub fn with_origin(mut self, origin: ActorId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn on_data_update(mut self, callback: DataUpdateFn) -> Self {
        self.update_data = Some(callback);
        self
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

impl Command for AddPropertyCommand {
    fn target_file(&self) -> &FileId {
        &self.file
    }

    fn path(&self) -> &DataPath {
        &self.parent_path
    }

    fn old_value(&self) -> &Value {
        &self.old_object
    }

    fn new_value(&self) -> &Value {
        &self.new_object
    }

    fn origin(&self) -> Option<&ActorId> {
        self.origin.as_ref()
    }

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, property = %self.property, "adding property");
        let value = self.new_object.clone();
        write_back(
            ctx,
            &self.file,
            &self.parent_path,
            &mut self.update_data,
            &value,
        );
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, property = %self.property, "removing added property");
        let value = self.old_object.clone();
        write_back(
            ctx,
            &self.file,
            &self.parent_path,
            &mut self.update_data,
            &value,
        );
        Ok(())
    }
}

/// Remove a member from an object.
pub struct DeletePropertyCommand {
    file: FileId,
    parent_path: DataPath,
    property: String,
    old_object: Value,
    new_object: Value,
    origin: Option<ActorId>,
    update_data: Option<DataUpdateFn>,
}

impl DeletePropertyCommand {
    pub fn new(
        file: FileId,
        parent_path: DataPath,
        property: impl Into<String>,
        object_before: Value,
    ) -> Self {
        let property = property.into();
        let mut new_object = object_before.clone();
        if let Value::Object(map) = &mut new_object {
            map.shift_remove(&property);
        }
        Self {
            file,
            parent_path,
            property,
            old_object: object_before,
            new_object,
            origin: None,
            update_data: None,
        }
    }

    pub fn with_origin(mut self, origin: ActorId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn on_data_update(mut self, callback: DataUpdateFn) -> Self {
        self.update_data = Some(callback);
        self
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

impl Command for DeletePropertyCommand {
    fn target_file(&self) -> &FileId {
        &self.file
    }

    fn path(&self) -> &DataPath {
        &self.parent_path
    }

    fn old_value(&self) -> &Value {
        &self.old_object
    }

    fn new_value(&self) -> &Value {
        &self.new_object
    }

    fn origin(&self) -> Option<&ActorId> {
        self.origin.as_ref()
    }

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, property = %self.property, "deleting property");
        let value = self.new_object.clone();
        write_back(
            ctx,
            &self.file,
            &self.parent_path,
            &mut self.update_data,
            &value,
        );
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, property = %self.property, "restoring deleted property");
        let value = self.old_object.clone();
        write_back(
            ctx,
            &self.file,
            &self.parent_path,
            &mut self.update_data,
            &value,
        );
        Ok(())
    }
}

/// Root-level structural changes replace the stored document and rebuild
/// the view; nested ones only feed the live-view mirror. The stack's own
/// path write runs after this and is idempotent for the root case.
fn write_back(
    ctx: &mut CommandContext<'_>,
    file: &FileId,
    parent_path: &DataPath,
    update_data: &mut Option<DataUpdateFn>,
    value: &Value,
) {
    if let Some(callback) = update_data {
        callback(parent_path, value);
    }
    if parent_path.is_root() {
        ctx.store.set(file.clone(), value.clone());
        ctx.refresh_view(file);
    }
}
