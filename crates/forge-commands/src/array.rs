//! Structural add/remove of array items.
//!
//! Old and new values are the entire array before and after the change.
//! Deleting shifts every later item down by one; replacing the whole array
//! keeps anything keyed by index (labels, paths, the live-view mirror)
//! consistent without per-item bookkeeping.

use crate::command::{Command, CommandContext, DataUpdateFn};
use crate::error::Result;
use forge_data::{DataPath, Value};
use forge_store::{ActorId, FileId};
use tracing::debug;

/// Insert an item at an index, padding with nulls when the index lies past
/// the current end.
pub struct AddArrayItemCommand {
    file: FileId,
    array_path: DataPath,
    index: usize,
    old_array: Value,
    new_array: Value,
    origin: Option<ActorId>,
    update_data: Option<DataUpdateFn>,
}

impl AddArrayItemCommand {
    pub fn new(
        file: FileId,
        array_path: DataPath,
        array_before: Value,
        index: usize,
        item: Value,
    ) -> Self {
        let mut new_array = array_before.clone();
        if let Value::Array(seq) = &mut new_array {
            while seq.len() <= index {
                seq.push(Value::Null);
            }
            seq[index] = item;
        }
        Self {
            file,
            array_path,
            index,
            old_array: array_before,
            new_array,
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

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Command for AddArrayItemCommand {
    fn target_file(&self) -> &FileId {
        &self.file
    }

    fn path(&self) -> &DataPath {
        &self.array_path
    }

    fn old_value(&self) -> &Value {
        &self.old_array
    }

    fn new_value(&self) -> &Value {
        &self.new_array
    }

    fn origin(&self) -> Option<&ActorId> {
        self.origin.as_ref()
    }

    fn apply(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.array_path, index = self.index, "adding array item");
        if let Some(callback) = &mut self.update_data {
            callback(&self.array_path, &self.new_array);
        }
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.array_path, index = self.index, "removing added array item");
        if let Some(callback) = &mut self.update_data {
            callback(&self.array_path, &self.old_array);
        }
        Ok(())
    }
}

/// Remove the item at an index, shifting every later item down by one.
pub struct DeleteArrayItemCommand {
    file: FileId,
    array_path: DataPath,
    index: usize,
    old_array: Value,
    new_array: Value,
    origin: Option<ActorId>,
    update_data: Option<DataUpdateFn>,
}

impl DeleteArrayItemCommand {
    pub fn new(file: FileId, array_path: DataPath, array_before: Value, index: usize) -> Self {
        let mut new_array = array_before.clone();
        if let Value::Array(seq) = &mut new_array {
            if index < seq.len() {
                seq.remove(index);
            }
        }
        Self {
            file,
            array_path,
            index,
            old_array: array_before,
            new_array,
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

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Command for DeleteArrayItemCommand {
    fn target_file(&self) -> &FileId {
        &self.file
    }

    fn path(&self) -> &DataPath {
        &self.array_path
    }

    fn old_value(&self) -> &Value {
        &self.old_array
    }

    fn new_value(&self) -> &Value {
        &self.new_array
    }

    fn origin(&self) -> Option<&ActorId> {
        self.origin.as_ref()
    }

    fn apply(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.array_path, index = self.index, "deleting array item");
        if let Some(callback) = &mut self.update_data {
            callback(&self.array_path, &self.new_array);
        }
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.array_path, index = self.index, "restoring deleted array item");
        if let Some(callback) = &mut self.update_data {
            callback(&self.array_path, &self.old_array);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_at_end() {
        let command = AddArrayItemCommand::new(
            FileId::from("player.player"),
            DataPath::parse("planet_levels"),
            json!([1, 2]),
            2,
            json!(3),
        );
        assert_eq!(command.new_value(), &json!([1, 2, 3]));
    }

    #[test]
    fn test_add_past_end_pads_with_nulls() {
        let command = AddArrayItemCommand::new(
            FileId::from("player.player"),
            DataPath::parse("planet_levels"),
            json!([1]),
            3,
            json!(9),
        );
        assert_eq!(command.new_value(), &json!([1, null, null, 9]));
    }

    #[test]
    fn test_delete_shifts_later_items() {
        let command = DeleteArrayItemCommand::new(
            FileId::from("player.player"),
            DataPath::parse("planet_levels"),
            json!(["a", "b", "c"]),
            1,
        );
        assert_eq!(command.new_value(), &json!(["a", "c"]));
        assert_eq!(command.old_value(), &json!(["a", "b", "c"]));
    }

    #[test]
    fn test_delete_out_of_range_is_identity() {
        let command = DeleteArrayItemCommand::new(
            FileId::from("player.player"),
            DataPath::parse("planet_levels"),
            json!(["a"]),
            5,
        );
        assert_eq!(command.new_value(), command.old_value());
    }
}
