//! # forge-commands
//!
//! Command variants and the undo/redo stack for the entforge editor
//! engine.
//!
//! This crate provides:
//! - The [`Command`] trait - a reversible unit of document mutation
//! - Value, property, array, conditional and composite command variants
//! - File-level commands with manifest side effects (entity copy/delete,
//!   localized text, research subjects)
//! - [`CommandStack`] - push/undo/redo with modified-file tracking and
//!   save orchestration
//!
//! ## Example
//!
//! ```rust,ignore
//! use forge_commands::{CommandStack, EditValueCommand};
//! use forge_data::DataPath;
//! use forge_store::{FileId, ModLayout};
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
//! stack.undo()?;
//! ```

pub mod array;
pub mod command;
pub mod composite;
pub mod conditional;
pub mod error;
pub mod file;
pub mod property;
pub mod research;
pub mod schema;
pub mod stack;
pub mod value;

// Command abstraction exports
pub use command::{Command, CommandContext, DataUpdateFn, UiUpdate, WidgetUpdateFn};

// Command variant exports
pub use array::{AddArrayItemCommand, DeleteArrayItemCommand};
pub use composite::CompositeCommand;
pub use conditional::ConditionalChangeCommand;
pub use file::{CopyEntityCommand, CreateLocalizedTextCommand, DeleteEntityCommand};
pub use property::{AddPropertyCommand, DeletePropertyCommand};
pub use research::{
    CreateResearchSubjectCommand, DeleteResearchSubjectCommand, SubjectScope, SubjectSettings,
    RESEARCH_SUBJECT_KIND,
};
pub use value::EditValueCommand;

// Stack exports
pub use stack::CommandStack;

// Schema exports
pub use schema::{
    condition_matches, default_for_schema, is_required, NullSchemaProvider, Schema,
    SchemaProvider, StaticSchemaProvider,
};

// Error exports
pub use error::CommandError;
