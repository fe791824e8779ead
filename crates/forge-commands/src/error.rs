//! Error types for the command layer.

use forge_data::DataError;
use forge_store::StoreError;
use thiserror::Error;

/// Errors that can occur preparing or executing commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A precondition check failed during `prepare`; nothing was mutated.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// A path-scoped command was pushed for a file with no stored document.
    #[error("No document loaded for {0}")]
    DocumentNotLoaded(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;
