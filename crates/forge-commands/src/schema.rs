//! Schema queries the command layer depends on.
//!
//! Schema loading and reference resolution live in the editor shell; the
//! engine only needs three questions answered: which schema governs a
//! path, what default value a schema produces, and whether a conditional
//! branch's `if` matches an object.

use forge_data::{DataPath, PathKey, Value};
use forge_store::FileId;
use serde_json::json;
use std::collections::HashMap;

/// A schema fragment, in its raw JSON form.
pub type Schema = Value;

/// Answers the engine's schema questions.
pub trait SchemaProvider {
    /// Schema governing `path` within `file`, if known.
    fn schema_for_path(&self, file: &FileId, path: &DataPath) -> Option<Schema>;

    /// Default value for a freshly added property of `schema`.
    fn default_value(&self, schema: &Schema) -> Value {
        default_for_schema(schema)
    }

    /// Whether a conditional branch's `if` matches `data`.
    fn condition_matches(&self, condition: &Schema, data: &Value) -> bool {
        condition_matches(condition, data)
    }
}

/// Provider with no schema knowledge. Conditional commands degrade to
/// plain property edits under it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSchemaProvider;

impl SchemaProvider for NullSchemaProvider {
    fn schema_for_path(&self, _file: &FileId, _path: &DataPath) -> Option<Schema> {
        None
    }
}

/// Fixed per-file root schemas with structural descent through
/// `properties` and `items`.
#[derive(Clone, Debug, Default)]
pub struct StaticSchemaProvider {
    roots: HashMap<FileId, Schema>,
}

impl StaticSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: FileId, schema: Schema) {
        self.roots.insert(file, schema);
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn schema_for_path(&self, file: &FileId, path: &DataPath) -> Option<Schema> {
        let mut schema = self.roots.get(file)?;
        for key in path.keys() {
            schema = match key {
                PathKey::Key(k) => schema.get("properties")?.get(k)?,
                PathKey::Index(_) => schema.get("items")?,
            };
        }
        Some(schema.clone())
    }
}

/// Default value synthesized for `schema`: an explicit `default` wins, then
/// the first `enum` entry, then the type's zero value.
pub fn default_for_schema(schema: &Value) -> Value {
    if let Some(default) = schema.get("default") {
        return default.clone();
    }
    if let Some(first) = schema.get("enum").and_then(Value::as_array).and_then(|e| e.first()) {
        return first.clone();
    }
    match schema.get("type").and_then(Value::as_str) {
        Some("string") => json!(""),
        Some("integer") => json!(0),
        Some("number") => json!(0.0),
        Some("boolean") => json!(false),
        Some("array") => json!([]),
        Some("object") => json!({}),
        _ => Value::Null,
    }
}

/// The JSON-Schema `if` subset the editor's schemas use: per-property
/// `const`/`enum` constraints plus a `required` list. Every clause must
/// hold; a condition with no clauses matches any object.
pub fn condition_matches(condition: &Value, data: &Value) -> bool {
    let Value::Object(data_map) = data else {
        return false;
    };
    if let Some(required) = condition.get("required").and_then(Value::as_array) {
        for key in required {
            match key.as_str() {
                Some(k) if data_map.contains_key(k) => {}
                _ => return false,
            }
        }
    }
    if let Some(Value::Object(props)) = condition.get("properties") {
        for (prop, constraint) in props {
            let Some(actual) = data_map.get(prop) else {
                return false;
            };
            if let Some(expected) = constraint.get("const") {
                if actual != expected {
                    return false;
                }
            }
            if let Some(allowed) = constraint.get("enum").and_then(Value::as_array) {
                if !allowed.contains(actual) {
                    return false;
                }
            }
        }
    }
    true
}

/// Whether `property` is listed in the `required` array of `schema`.
///
/// Callers must check this before constructing a delete-property command;
/// required members are never offered for deletion.
pub fn is_required(schema: &Value, property: &str) -> bool {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|req| req.iter().any(|v| v.as_str() == Some(property)))
        .unwrap_or(false)
}
