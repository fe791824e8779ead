//! # forge-data
//!
//! Value and path primitives for the entforge editor engine.
//!
//! This crate provides:
//! - [`DataPath`] addressing into JSON-like documents
//! - The path-addressed read/write algorithm (writers auto-create
//!   intermediate containers, readers never do)
//! - On-disk JSON I/O in the editor's 4-space-indent format, with
//!   stage-then-commit writes

pub mod error;
pub mod json;
pub mod path;

pub use error::DataError;
pub use json::{read_json_file, to_document_string, write_json_file, WriteBatch};
pub use path::{read_path, read_path_mut, write_path, DataPath, PathKey};

/// A JSON document value, re-exported so downstream crates share one type.
pub use serde_json::Value;
