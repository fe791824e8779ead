//! Change notification - per-file subscriber registry.
//!
//! Subscribers receive either path-scoped partial updates or full-document
//! refresh events. Delivery is synchronous and registration-ordered on the
//! calling thread; a failing subscriber is logged and skipped without
//! affecting the rest.

use crate::actor::ActorId;
use crate::store::FileId;
use forge_data::{DataPath, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};
use ulid::Ulid;

/// Handle identifying one subscription, for later removal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    fn new() -> Self {
        Self(Ulid::new().to_string())
    }
}

/// A change delivered to subscribers of one file.
#[derive(Debug)]
pub struct ChangeEvent<'a> {
    /// Current document for the file, after the change.
    pub document: &'a Value,
    /// Path that changed; `None` means "treat this as a full refresh".
    pub path: Option<&'a DataPath>,
    /// New value at `path`; `None` for full refreshes.
    pub value: Option<&'a Value>,
    /// Actor that initiated the change, for echo suppression.
    pub origin: Option<&'a ActorId>,
}

/// Error a subscriber may report. Logged, never propagated.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

/// Callback invoked with every change to a subscribed file.
pub type ChangeCallback = Box<dyn FnMut(&ChangeEvent<'_>) -> std::result::Result<(), SubscriberError>>;

struct Subscriber {
    id: SubscriptionId,
    callback: ChangeCallback,
}

/// Per-file subscriber registry.
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: HashMap<FileId, Vec<Subscriber>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for changes to `file`.
    pub fn subscribe(&mut self, file: FileId, callback: ChangeCallback) -> SubscriptionId {
        let id = SubscriptionId::new();
        debug!(%file, "registered change subscriber");
        self.subscribers.entry(file).or_default().push(Subscriber {
            id: id.clone(),
            callback,
        });
        id
    }

    /// Remove a previously registered callback. Returns whether anything
    /// was removed.
    pub fn unsubscribe(&mut self, file: &FileId, id: &SubscriptionId) -> bool {
        let Some(subs) = self.subscribers.get_mut(file) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|sub| &sub.id != id);
        before != subs.len()
    }

    pub fn subscriber_count(&self, file: &FileId) -> usize {
        self.subscribers.get(file).map(Vec::len).unwrap_or(0)
    }

    /// Deliver a path-scoped update to every subscriber of `file`.
    pub fn notify_partial(
        &mut self,
        file: &FileId,
        document: &Value,
        path: &DataPath,
        value: &Value,
        origin: Option<&ActorId>,
    ) {
        self.deliver(
            file,
            &ChangeEvent {
                document,
                path: Some(path),
                value: Some(value),
                origin,
            },
        );
    }

    /// Deliver a full-refresh event to every subscriber of `file`.
    pub fn notify_full(&mut self, file: &FileId, document: &Value) {
        self.deliver(
            file,
            &ChangeEvent {
                document,
                path: None,
                value: None,
                origin: None,
            },
        );
    }

    fn deliver(&mut self, file: &FileId, event: &ChangeEvent<'_>) {
        let Some(subs) = self.subscribers.get_mut(file) else {
            return;
        };
        for sub in subs.iter_mut() {
            if let Err(error) = (sub.callback)(event) {
                warn!(%file, %error, "change subscriber failed, continuing");
            }
        }
    }
}
