//! Smoke test for the facade crate: one editor session end to end.

use entforge::{
    CommandStack, CopyEntityCommand, DataPath, EditValueCommand, FileId, ModLayout,
};
use serde_json::json;

#[test]
fn test_editor_session_through_facade() {
    let dir = tempfile::tempdir().unwrap();
    let mut stack = CommandStack::new(ModLayout::new(dir.path()));
    let layout = stack.layout().clone();

    // Open a unit, edit it, save it.
    let unit = FileId::from(dir.path().join("entities").join("scout.unit"));
    stack.store_mut().set(unit.clone(), json!({"hull": 100}));
    stack
        .push(Box::new(EditValueCommand::new(
            unit.clone(),
            DataPath::parse("hull"),
            json!(100),
            json!(450),
        )))
        .unwrap();
    assert!(stack.save_file(&unit).unwrap());
    assert!(!stack.has_unsaved_changes());

    // Copy it under a new id; the manifest follows.
    stack
        .registry_mut()
        .insert_mod("unit", "scout", json!({"hull": 450}));
    let mut copy = CopyEntityCommand::new(&layout, "scout", "unit", "scout_mk2", false);
    copy.prepare(&stack.context()).unwrap();
    stack.push(Box::new(copy)).unwrap();

    let manifest = layout.manifest_file("unit").unwrap();
    assert_eq!(
        entforge::forge_data::read_json_file(manifest.as_path()).unwrap(),
        json!({"ids": ["scout_mk2"]})
    );

    // Undo unwinds the copy, then the edit.
    stack.undo().unwrap();
    assert!(!layout.entity_file("unit", "scout_mk2").as_path().exists());
    stack.undo().unwrap();
    assert_eq!(stack.store().get(&unit).unwrap(), json!({"hull": 100}));
    assert!(!stack.can_undo());
}
