//! End-to-end editor flows through the command stack
//!
//! These tests drive the stack the way the editor shell does: load
//! documents, push commands, undo/redo, copy entities with manifest side
//! effects, and save.

use forge_commands::{
    AddPropertyCommand, Command, CommandStack, CompositeCommand, CopyEntityCommand,
    CreateLocalizedTextCommand, DeleteArrayItemCommand, DeletePropertyCommand, EditValueCommand,
    StaticSchemaProvider,
};
use forge_data::{json as forge_json, read_path, DataPath};
use forge_store::{ActorId, FileId, ModLayout};
use serde_json::json;
use std::fs;

fn workspace() -> (tempfile::TempDir, CommandStack) {
    let dir = tempfile::tempdir().unwrap();
    let stack = CommandStack::new(ModLayout::new(dir.path()));
    (dir, stack)
}

// ============================================================================
// Value edits across files
// ============================================================================

#[test]
fn test_edit_session_with_undo_across_two_files() {
    let (_dir, mut stack) = workspace();
    let unit = FileId::from("entities/scout.unit");
    let weapon = FileId::from("entities/railgun.weapon");
    stack.store_mut().set(unit.clone(), json!({"hull": 100}));
    stack.store_mut().set(weapon.clone(), json!({"damage": 10}));

    stack
        .push(Box::new(EditValueCommand::new(
            unit.clone(),
            DataPath::parse("hull"),
            json!(100),
            json!(450),
        )))
        .unwrap();
    stack
        .push(Box::new(EditValueCommand::new(
            weapon.clone(),
            DataPath::parse("damage"),
            json!(10),
            json!(25),
        )))
        .unwrap();

    assert_eq!(stack.modified_files(), vec![weapon.clone(), unit.clone()]);

    // Undo affects the weapon (last command), not the unit.
    stack.undo().unwrap();
    assert_eq!(stack.store().get(&weapon).unwrap(), json!({"damage": 10}));
    assert_eq!(stack.store().get(&unit).unwrap(), json!({"hull": 450}));
}

#[test]
fn test_echo_origin_reaches_subscribers() {
    let (_dir, mut stack) = workspace();
    let unit = FileId::from("entities/scout.unit");
    stack.store_mut().set(unit.clone(), json!({"hull": 100}));

    let origin = ActorId::new();
    let seen: std::rc::Rc<std::cell::RefCell<Vec<Option<ActorId>>>> = Default::default();
    let sink = seen.clone();
    stack.notifier_mut().subscribe(
        unit.clone(),
        Box::new(move |event| {
            sink.borrow_mut().push(event.origin.cloned());
            Ok(())
        }),
    );

    stack
        .push(Box::new(
            EditValueCommand::new(unit, DataPath::parse("hull"), json!(100), json!(450))
                .with_origin(origin.clone()),
        ))
        .unwrap();

    assert_eq!(*seen.borrow(), vec![Some(origin)]);
}

// ============================================================================
// Structural commands
// ============================================================================

#[test]
fn test_root_property_change_triggers_full_refresh() {
    let (_dir, mut stack) = workspace();
    let unit = FileId::from("entities/scout.unit");
    stack.store_mut().set(unit.clone(), json!({"name": "scout"}));

    let refreshes = std::rc::Rc::new(std::cell::RefCell::new(0usize));
    let sink = refreshes.clone();
    stack.notifier_mut().subscribe(
        unit.clone(),
        Box::new(move |event| {
            if event.path.is_none() {
                *sink.borrow_mut() += 1;
            }
            Ok(())
        }),
    );

    stack
        .push(Box::new(AddPropertyCommand::new(
            unit.clone(),
            DataPath::root(),
            "description",
            json!({"name": "scout"}),
            json!(""),
        )))
        .unwrap();
    assert_eq!(
        stack.store().get(&unit).unwrap(),
        json!({"name": "scout", "description": ""})
    );
    assert_eq!(*refreshes.borrow(), 1);

    stack.undo().unwrap();
    assert_eq!(stack.store().get(&unit).unwrap(), json!({"name": "scout"}));
    assert_eq!(*refreshes.borrow(), 2);
}

#[test]
fn test_nested_delete_property_roundtrip() {
    let (_dir, mut stack) = workspace();
    let unit = FileId::from("entities/scout.unit");
    stack.store_mut().set(
        unit.clone(),
        json!({"weapon": {"name": "railgun", "charge": 3}}),
    );

    stack
        .push(Box::new(DeletePropertyCommand::new(
            unit.clone(),
            DataPath::parse("weapon"),
            "charge",
            json!({"name": "railgun", "charge": 3}),
        )))
        .unwrap();
    assert_eq!(
        stack.store().get(&unit).unwrap(),
        json!({"weapon": {"name": "railgun"}})
    );

    stack.undo().unwrap();
    assert_eq!(
        stack.store().get(&unit).unwrap(),
        json!({"weapon": {"name": "railgun", "charge": 3}})
    );
}

#[test]
fn test_array_delete_shifts_live_view_mirror() {
    let (_dir, mut stack) = workspace();
    let player = FileId::from("player.player");
    stack
        .store_mut()
        .set(player.clone(), json!({"planet_levels": ["a", "b", "c"]}));

    let mirror: std::rc::Rc<std::cell::RefCell<serde_json::Value>> =
        std::rc::Rc::new(std::cell::RefCell::new(json!(null)));
    let sink = mirror.clone();

    stack
        .push(Box::new(
            DeleteArrayItemCommand::new(
                player.clone(),
                DataPath::parse("planet_levels"),
                json!(["a", "b", "c"]),
                0,
            )
            .on_data_update(Box::new(move |_path, value| {
                *sink.borrow_mut() = value.clone();
            })),
        ))
        .unwrap();

    // Items shifted down by one, in the store and in the mirror.
    assert_eq!(
        stack.store().get(&player).unwrap(),
        json!({"planet_levels": ["b", "c"]})
    );
    assert_eq!(*mirror.borrow(), json!(["b", "c"]));

    stack.undo().unwrap();
    assert_eq!(*mirror.borrow(), json!(["a", "b", "c"]));
}

#[test]
fn test_composite_bundles_undo_as_one_step() {
    let (_dir, mut stack) = workspace();
    let unit = FileId::from("entities/scout.unit");
    stack
        .store_mut()
        .set(unit.clone(), json!({"hull": 100, "shields": 50}));

    let composite = CompositeCommand::new(vec![
        Box::new(EditValueCommand::new(
            unit.clone(),
            DataPath::parse("hull"),
            json!(100),
            json!(450),
        )),
        Box::new(EditValueCommand::new(
            unit.clone(),
            DataPath::parse("shields"),
            json!(50),
            json!(80),
        )),
    ])
    .unwrap();

    stack.push(Box::new(composite)).unwrap();
    // The stack's own write covers the first sub-command's path; the
    // second ran through its apply.
    assert_eq!(
        read_path(&stack.store().get(&unit).unwrap(), &DataPath::parse("hull")),
        Some(&json!(450))
    );

    stack.undo().unwrap();
    assert_eq!(
        read_path(&stack.store().get(&unit).unwrap(), &DataPath::parse("hull")),
        Some(&json!(100))
    );
    assert!(!stack.can_undo());
}

// ============================================================================
// Entity copy with manifest side effects
// ============================================================================

#[test]
fn test_copy_entity_manifest_consistency() {
    let (_dir, mut stack) = workspace();
    let layout = stack.layout().clone();
    stack
        .registry_mut()
        .insert_mod("unit", "scout", json!({"hull": 450, "name": "scout"}));
    let manifest_file = layout.manifest_file("unit").unwrap();
    forge_json::write_json_file(manifest_file.as_path(), &json!({"ids": ["scout", "zephyr"]}))
        .unwrap();
    let manifest_bytes_before = fs::read(manifest_file.as_path()).unwrap();

    let mut command = CopyEntityCommand::new(&layout, "scout", "unit", "anchor", false);
    command.prepare(&stack.context()).unwrap();
    stack.push(Box::new(command)).unwrap();

    // New id lands sorted in the manifest, on disk and in the store.
    let created = layout.entity_file("unit", "anchor");
    assert_eq!(
        forge_json::read_json_file(created.as_path()).unwrap(),
        json!({"hull": 450, "name": "scout"})
    );
    assert_eq!(
        forge_json::read_json_file(manifest_file.as_path()).unwrap(),
        json!({"ids": ["anchor", "scout", "zephyr"]})
    );
    assert_eq!(
        stack.store().get(&manifest_file).unwrap(),
        json!({"ids": ["anchor", "scout", "zephyr"]})
    );
    assert!(stack.registry().contains_mod("unit", "anchor"));
    assert!(stack.store().is_modified(&manifest_file));

    // Undo deletes the file and restores the manifest byte-for-byte.
    stack.undo().unwrap();
    assert!(!created.as_path().exists());
    assert_eq!(
        fs::read(manifest_file.as_path()).unwrap(),
        manifest_bytes_before
    );
    assert!(!stack.registry().contains_mod("unit", "anchor"));

    // Redo recreates both sides.
    stack.redo().unwrap();
    assert!(created.as_path().exists());
    assert_eq!(
        forge_json::read_json_file(manifest_file.as_path()).unwrap(),
        json!({"ids": ["anchor", "scout", "zephyr"]})
    );
}

#[test]
fn test_copy_from_base_game_registry_tier() {
    let (_dir, mut stack) = workspace();
    let layout = stack.layout().clone();
    stack
        .registry_mut()
        .insert_base("unit", "vanilla_scout", json!({"hull": 300}));

    let mut command = CopyEntityCommand::new(&layout, "vanilla_scout", "unit", "my_scout", false);
    command.prepare(&stack.context()).unwrap();
    stack.push(Box::new(command)).unwrap();

    let created = layout.entity_file("unit", "my_scout");
    assert_eq!(
        forge_json::read_json_file(created.as_path()).unwrap(),
        json!({"hull": 300})
    );
    // The copy is a mod entity now; the base tier is untouched.
    assert!(stack.registry().contains_mod("unit", "my_scout"));
    assert!(!stack.registry().contains_mod("unit", "vanilla_scout"));
}

// ============================================================================
// Localized text
// ============================================================================

#[test]
fn test_localized_string_created_and_saved() {
    let (_dir, mut stack) = workspace();
    let layout = stack.layout().clone();

    let command = CreateLocalizedTextCommand::new(&layout, "scout_name", "Scout Frigate", "en");
    let file = command.target_file().clone();
    stack.push(Box::new(command)).unwrap();

    assert_eq!(stack.strings().get("en", "scout_name"), Some("Scout Frigate"));
    assert!(stack.store().is_modified(&file));

    // The text file is only written on save.
    assert!(!file.as_path().exists());
    assert!(stack.save_file(&file).unwrap());
    assert_eq!(
        forge_json::read_json_file(file.as_path()).unwrap(),
        json!({"scout_name": "Scout Frigate"})
    );

    stack.undo().unwrap();
    assert!(!stack.strings().contains("en", "scout_name"));
    assert_eq!(stack.store().get(&file).unwrap(), json!({}));
}

// ============================================================================
// Schema-guarded deletes
// ============================================================================

#[test]
fn test_required_properties_are_not_offered_for_deletion() {
    // The caller layer consults the schema before ever constructing a
    // delete command; this mirrors that check.
    let file = FileId::from("entities/scout.unit");
    let mut schemas = StaticSchemaProvider::new();
    schemas.insert(
        file.clone(),
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {"name": {"type": "string"}, "description": {"type": "string"}}
        }),
    );
    let stack = CommandStack::with_schemas(
        ModLayout::new("."),
        Box::new(schemas),
    );

    let schema = stack
        .schemas()
        .schema_for_path(&file, &DataPath::root())
        .unwrap();
    assert!(forge_commands::is_required(&schema, "name"));
    assert!(!forge_commands::is_required(&schema, "description"));
}
