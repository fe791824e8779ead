//! # entforge
//!
//! Undo/redo command engine and document store for a game-mod entity
//! editor. The editor shell builds widgets from schemas; this workspace
//! owns everything underneath: per-file document snapshots, path-addressed
//! mutation, reversible commands with manifest side effects, and the
//! unsaved-changes bookkeeping that drives save prompts.
//!
//! The facade re-exports the three layers:
//! - [`forge_data`] - values, paths, on-disk JSON format
//! - [`forge_store`] - document store, change notification, registries
//! - [`forge_commands`] - command variants and the undo/redo stack
//!
//! ## Example
//!
//! ```rust,ignore
//! use entforge::{CommandStack, DataPath, EditValueCommand, FileId, ModLayout};
//! use serde_json::json;
//!
//! let mut stack = CommandStack::new(ModLayout::new("mods/expanse"));
//! let file = FileId::from("mods/expanse/entities/scout.unit");
//! stack.store_mut().set(file.clone(), json!({"hull": 100}));
//!
//! stack.push(Box::new(EditValueCommand::new(
//!     file.clone(),
//!     DataPath::parse("hull"),
//!     json!(100),
//!     json!(450),
//! )))?;
//! assert!(stack.can_undo());
//! ```

pub use forge_commands;
pub use forge_data;
pub use forge_store;

// Data exports
pub use forge_data::{read_path, write_path, DataError, DataPath, PathKey, Value};

// Store exports
pub use forge_store::{
    ActorId, ChangeEvent, ChangeNotifier, DocumentStore, EntityRegistry, FileId, ModLayout,
    StoreError, StringCatalog, SubscriptionId,
};

// Command exports
pub use forge_commands::{
    AddArrayItemCommand, AddPropertyCommand, Command, CommandContext, CommandError, CommandStack,
    CompositeCommand, ConditionalChangeCommand, CopyEntityCommand, CreateLocalizedTextCommand,
    CreateResearchSubjectCommand, DeleteArrayItemCommand, DeleteEntityCommand,
    DeletePropertyCommand, DeleteResearchSubjectCommand, EditValueCommand, NullSchemaProvider,
    SchemaProvider, StaticSchemaProvider, SubjectScope, SubjectSettings, UiUpdate,
};
