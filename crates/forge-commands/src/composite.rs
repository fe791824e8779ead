//! Composite commands - ordered bundles applied and reverted as one unit.

use crate::command::{Command, CommandContext};
use crate::error::{CommandError, Result};
use forge_data::{DataPath, Value};
use forge_store::{ActorId, FileId};

/// An ordered bundle of commands treated as one undo/redo unit.
///
/// Sub-commands apply last-to-first (a structural transform runs before the
/// value edit that rides on it) and revert in the exact reverse of that
/// order, first-to-last. The stack-facing identity (file, path, old/new
/// value) is taken from the first sub-command.
pub struct CompositeCommand {
    commands: Vec<Box<dyn Command>>,
    file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    origin: Option<ActorId>,
}

impl CompositeCommand {
    pub fn new(commands: Vec<Box<dyn Command>>) -> Result<Self> {
        let first = commands.first().ok_or_else(|| {
            CommandError::PreconditionFailed("composite requires at least one sub-command".into())
        })?;
        let file = first.target_file().clone();
        let path = first.path().clone();
        let old_value = first.old_value().clone();
        let new_value = first.new_value().clone();
        let origin = first.origin().cloned();
        Ok(Self {
            commands,
            file,
            path,
            old_value,
            new_value,
            origin,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CompositeCommand {
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

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        for command in self.commands.iter_mut().rev() {
            command.apply(ctx)?;
        }
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        for command in self.commands.iter_mut() {
            command.revert(ctx)?;
        }
        Ok(())
    }
}
