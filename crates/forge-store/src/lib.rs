//! # forge-store
//!
//! In-memory state for the entforge editor engine.
//!
//! This crate provides:
//! - [`DocumentStore`] - per-file document snapshots and the modified set
//! - [`ChangeNotifier`] - per-file subscriber registry with partial and
//!   full-refresh events
//! - [`EntityRegistry`] / [`StringCatalog`] - in-memory mirrors of manifest
//!   and localized-text contents
//! - [`ModLayout`] - the directory conventions of a mod workspace

pub mod actor;
pub mod error;
pub mod layout;
pub mod notify;
pub mod registry;
pub mod store;
pub mod strings;

pub use actor::ActorId;
pub use error::StoreError;
pub use layout::{ModLayout, UNIFORM_KIND};
pub use notify::{ChangeCallback, ChangeEvent, ChangeNotifier, SubscriberError, SubscriptionId};
pub use registry::EntityRegistry;
pub use store::{DocumentStore, FileId};
pub use strings::StringCatalog;
