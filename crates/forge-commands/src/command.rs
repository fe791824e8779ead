//! Command abstraction - a reversible unit of document mutation.

use crate::error::Result;
use crate::schema::SchemaProvider;
use forge_data::{DataPath, Value};
use forge_store::{
    ActorId, ChangeNotifier, DocumentStore, EntityRegistry, FileId, ModLayout, StringCatalog,
};
use tracing::debug;

/// Outcome of pushing a value into a UI target.
///
/// A widget may have been destroyed by the time an undo fires; that is an
/// expected outcome, not a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiUpdate {
    Applied,
    TargetGone,
}

/// Pushes a new value into whatever widget displays it.
pub type WidgetUpdateFn = Box<dyn FnMut(&Value) -> UiUpdate>;

/// Keeps a secondary "currently displayed document" mirror consistent.
pub type DataUpdateFn = Box<dyn FnMut(&DataPath, &Value)>;

/// Mutable view of the engine state a command may touch while executing.
///
/// Borrowed from the [`CommandStack`](crate::stack::CommandStack) for the
/// duration of one `prepare`, `apply` or `revert` call.
pub struct CommandContext<'a> {
    pub store: &'a mut DocumentStore,
    pub notifier: &'a mut ChangeNotifier,
    pub registry: &'a mut EntityRegistry,
    pub strings: &'a mut StringCatalog,
    pub layout: &'a ModLayout,
    pub schemas: &'a dyn SchemaProvider,
}

impl CommandContext<'_> {
    /// Ask subscribers of `file` to rebuild their whole view.
    pub fn refresh_view(&mut self, file: &FileId) {
        if let Some(document) = self.store.get(file) {
            self.notifier.notify_full(file, &document);
        }
    }
}

/// A reversible unit of work against one document.
///
/// The stack drives the lifecycle: `apply` runs on push and redo, `revert`
/// on undo, strictly alternating. After either call the stack writes the
/// command's new/old value at its path into the stored document and
/// notifies subscribers, so commands only carry their own side effects
/// (UI mirrors, registries, the filesystem).
pub trait Command {
    /// The document this command mutates.
    fn target_file(&self) -> &FileId;

    /// Path within the target document; empty means whole-document replace.
    fn path(&self) -> &DataPath;

    /// Document-equivalent state before the command.
    fn old_value(&self) -> &Value;

    /// Document-equivalent state after the command.
    fn new_value(&self) -> &Value;

    /// Actor that initiated the change, for notification echo suppression.
    fn origin(&self) -> Option<&ActorId> {
        None
    }

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()>;

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()>;
}

/// Run a widget callback, treating a vanished target as non-fatal.
pub(crate) fn update_widget_safely(callback: &mut Option<WidgetUpdateFn>, value: &Value) {
    if let Some(callback) = callback {
        if callback(value) == UiUpdate::TargetGone {
            debug!("widget target gone, skipping UI update");
        }
    }
}
