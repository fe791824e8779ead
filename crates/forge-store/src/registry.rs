//! Entity registry - in-memory mirror of manifest contents.
//!
//! Two tiers: the mod's own entities (writable) and the base game's
//! (read-only reference data). Commands that create or delete entity files
//! keep the mod tier consistent with the manifest file inside the same
//! operation, so the registry is always safe to drive entity lists from.

use forge_data::Value;
use std::collections::{BTreeMap, HashMap};

/// Mirror of entity data keyed by kind and id.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    mods: HashMap<String, BTreeMap<String, Value>>,
    base: HashMap<String, BTreeMap<String, Value>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity in the mod tier.
    pub fn insert_mod(&mut self, kind: impl Into<String>, id: impl Into<String>, data: Value) {
        self.mods
            .entry(kind.into())
            .or_default()
            .insert(id.into(), data);
    }

    /// Register an entity in the base-game tier. Base entries are reference
    /// data and are never mutated by commands.
    pub fn insert_base(&mut self, kind: impl Into<String>, id: impl Into<String>, data: Value) {
        self.base
            .entry(kind.into())
            .or_default()
            .insert(id.into(), data);
    }

    /// Remove a mod-tier entity, returning its data.
    pub fn remove_mod(&mut self, kind: &str, id: &str) -> Option<Value> {
        self.mods.get_mut(kind)?.remove(id)
    }

    /// Look up an entity, preferring the mod tier. The flag is true when
    /// the base tier satisfied the lookup.
    pub fn get(&self, kind: &str, id: &str) -> Option<(&Value, bool)> {
        if let Some(data) = self.mods.get(kind).and_then(|m| m.get(id)) {
            return Some((data, false));
        }
        self.base.get(kind).and_then(|m| m.get(id)).map(|d| (d, true))
    }

    /// Mod-tier lookup only.
    pub fn get_mod(&self, kind: &str, id: &str) -> Option<&Value> {
        self.mods.get(kind)?.get(id)
    }

    pub fn contains_mod(&self, kind: &str, id: &str) -> bool {
        self.get_mod(kind, id).is_some()
    }

    /// Ids of all mod-tier entities of `kind`, in sorted order.
    pub fn mod_ids(&self, kind: &str) -> Vec<&str> {
        self.mods
            .get(kind)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
