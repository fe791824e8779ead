//! Error types for the store layer.

use forge_data::DataError;
use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
