//! Conditional-schema-driven property changes.
//!
//! Changing one property can flip `allOf`/`if`/`then` branches of the
//! parent object's schema, which adds or removes sibling properties. The
//! transition is therefore a whole-document swap between two prepared
//! snapshots rather than a path-scoped write, and both directions rebuild
//! the whole view.

use crate::command::{update_widget_safely, Command, CommandContext, WidgetUpdateFn};
use crate::error::{CommandError, Result};
use crate::schema::default_for_schema;
use forge_data::{read_path, read_path_mut, DataPath, PathKey, Value};
use forge_store::{ActorId, FileId};
use std::collections::BTreeSet;
use tracing::debug;

/// Change a property and every sibling its schema conditions imply.
pub struct ConditionalChangeCommand {
    file: FileId,
    path: DataPath,
    old_value: Value,
    new_value: Value,
    origin: Option<ActorId>,
    update_widget: Option<WidgetUpdateFn>,
    old_document: Option<Value>,
    new_document: Option<Value>,
}

impl ConditionalChangeCommand {
    pub fn new(file: FileId, path: DataPath, old_value: Value, new_value: Value) -> Self {
        Self {
            file,
            path,
            old_value,
            new_value,
            origin: None,
            update_widget: None,
            old_document: None,
            new_document: None,
        }
    }

    pub fn with_origin(mut self, origin: ActorId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn on_widget_update(mut self, callback: WidgetUpdateFn) -> Self {
        self.update_widget = Some(callback);
        self
    }

    /// The post-change document computed by [`prepare`](Self::prepare).
    pub fn new_document(&self) -> Option<&Value> {
        self.new_document.as_ref()
    }

    /// Snapshot the current document and compute the post-change document,
    /// including conditional side effects. Must succeed before push.
    pub fn prepare(&mut self, ctx: &CommandContext<'_>) -> Result<()> {
        let old_document = self
            .store_document(ctx)
            .ok_or_else(|| CommandError::DocumentNotLoaded(self.file.to_string()))?;

        let Some(PathKey::Key(property)) = self.path.last().cloned() else {
            return Err(CommandError::PreconditionFailed(
                "conditional change requires an object member path".into(),
            ));
        };
        let parent_path = self.path.parent().unwrap_or_default();

        let mut new_document = old_document.clone();
        let target = read_path_mut(&mut new_document, &parent_path).ok_or_else(|| {
            CommandError::PreconditionFailed(format!(
                "path {} does not exist in {}",
                parent_path, self.file
            ))
        })?;
        let Value::Object(map) = target else {
            return Err(CommandError::PreconditionFailed(format!(
                "parent of {} is not an object",
                self.path
            )));
        };
        map.insert(property, self.new_value.clone());

        let old_target = read_path(&old_document, &parent_path)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let updated_target = Value::Object(map.clone());

        if let Some(parent_schema) = ctx.schemas.schema_for_path(&self.file, &parent_path) {
            if let Some(branches) = parent_schema.get("allOf").and_then(Value::as_array) {
                let mut to_remove: BTreeSet<String> = BTreeSet::new();
                let mut to_add: Vec<(String, Value)> = Vec::new();

                for branch in branches {
                    let (Some(condition), Some(then)) = (branch.get("if"), branch.get("then"))
                    else {
                        continue;
                    };
                    let Some(branch_props) = then.get("properties").and_then(Value::as_object)
                    else {
                        continue;
                    };
                    let old_matches = ctx.schemas.condition_matches(condition, &old_target);
                    let new_matches = ctx.schemas.condition_matches(condition, &updated_target);

                    if old_matches && !new_matches {
                        debug!(%condition, "condition no longer matches");
                        to_remove.extend(branch_props.keys().cloned());
                    }
                    if !old_matches && new_matches {
                        debug!(%condition, "condition newly matches");
                        for (prop, schema) in branch_props {
                            to_add.push((prop.clone(), schema.clone()));
                        }
                    }
                }

                // A property only goes away if no still-matching branch
                // reintroduces it.
                for prop in &to_remove {
                    if !to_add.iter().any(|(p, _)| p == prop) {
                        map.shift_remove(prop);
                    }
                }
                for (prop, schema) in to_add {
                    if map.contains_key(&prop) {
                        continue;
                    }
                    map.insert(prop, synthesize_default(ctx, &schema));
                }
            }
        }

        self.old_document = Some(old_document);
        self.new_document = Some(new_document);
        Ok(())
    }

    fn store_document(&self, ctx: &CommandContext<'_>) -> Option<Value> {
        ctx.store.get(&self.file)
    }

    fn prepared(&self, snapshot: &Option<Value>) -> Result<Value> {
        snapshot.clone().ok_or_else(|| {
            CommandError::PreconditionFailed("conditional change was not prepared".into())
        })
    }
}

/// Defaults for an object schema include its required members; everything
/// else falls back to the provider's plain default.
fn synthesize_default(ctx: &CommandContext<'_>, schema: &Value) -> Value {
    let is_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let properties = schema.get("properties").and_then(Value::as_object);
    if let (true, Some(properties)) = (is_object, properties) {
        let mut object = serde_json::Map::new();
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if let Some(member_schema) = properties.get(name) {
                    object.insert(name.to_string(), ctx.schemas.default_value(member_schema));
                }
            }
        }
        return Value::Object(object);
    }
    ctx.schemas.default_value(schema)
}

impl Command for ConditionalChangeCommand {
    fn target_file(&self) -> &FileId {
        &self.file
    }

    fn path(&self) -> &DataPath {
        &self.path
    }

    fn old_value(&self) -> &Value {
        &self.old_value
    }

    fn new_value(&self) -> &Value {
        &self.new_value
    }

    fn origin(&self) -> Option<&ActorId> {
        self.origin.as_ref()
    }

    fn apply(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.path, "applying conditional change");
        let document = self.prepared(&self.new_document)?;
        update_widget_safely(&mut self.update_widget, &self.new_value);
        ctx.store.set(self.file.clone(), document);
        ctx.refresh_view(&self.file);
        Ok(())
    }

    fn revert(&mut self, ctx: &mut CommandContext<'_>) -> Result<()> {
        debug!(file = %self.file, path = %self.path, "reverting conditional change");
        let document = self.prepared(&self.old_document)?;
        update_widget_safely(&mut self.update_widget, &self.old_value);
        ctx.store.set(self.file.clone(), document);
        ctx.refresh_view(&self.file);
        Ok(())
    }
}
