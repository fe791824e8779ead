//! Localized-string catalog - in-memory mirror of localized text files.

use std::collections::{BTreeMap, HashMap};

/// Per-language localized strings the editor resolves display text from.
#[derive(Clone, Debug, Default)]
pub struct StringCatalog {
    languages: HashMap<String, BTreeMap<String, String>>,
}

impl StringCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        language: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.languages
            .entry(language.into())
            .or_default()
            .insert(key.into(), text.into());
    }

    pub fn remove(&mut self, language: &str, key: &str) -> Option<String> {
        self.languages.get_mut(language)?.remove(key)
    }

    pub fn get(&self, language: &str, key: &str) -> Option<&str> {
        self.languages.get(language)?.get(key).map(String::as_str)
    }

    pub fn contains(&self, language: &str, key: &str) -> bool {
        self.get(language, key).is_some()
    }
}
