use camdeck_core::{
    CameraFunction, ControlKey, CustomButton, DeviceInfo, MappingStore, PanelSettings,
    Sensitivity, DOCUMENT_VERSION,
};

fn populated_store() -> MappingStore {
    let mut store = MappingStore::in_memory();
    store.set_mapping(ControlKey::new(0x90, 36), CameraFunction::RecordStart);
    store.set_mapping(ControlKey::new(0x90, 37), CameraFunction::RecordStop);
    store.set_mapping(ControlKey::new(0xB0, 7), CameraFunction::Gain);

    let mut button = CustomButton::new("Key Light", CameraFunction::Light8Db);
    button.cc = Some(20);
    store.upsert_custom_button(button).unwrap();
    let mut button = CustomButton::new("Iris Fader", CameraFunction::Iris);
    button.cc = Some(21);
    button.value = Some(5.6);
    store.upsert_custom_button(button).unwrap();
    store
}

#[test]
fn test_mapping_export_shape() {
    let store = populated_store();
    let device = DeviceInfo {
        id: "port-1".into(),
        name: "nanoKONTROL2".into(),
        manufacturer: "KORG".into(),
    };
    let export = store.export_mappings(Some(device));
    assert_eq!(export.version, DOCUMENT_VERSION);
    assert_eq!(export.mappings.len(), 3);
    assert!(export
        .mappings
        .iter()
        .all(|entry| !entry.description.is_empty()));

    let json = serde_json::to_value(&export).unwrap();
    assert_eq!(json["device"]["name"], "nanoKONTROL2");
    assert!(json["mappings"][0].get("midiCommand").is_some());
    assert!(json["settings"].get("learnMode").is_some());
}

#[test]
fn test_round_trip_mappings_and_buttons() {
    let store = populated_store();
    let mappings_doc = serde_json::to_value(store.export_mappings(None)).unwrap();
    let buttons_doc = serde_json::to_value(store.export_custom_buttons()).unwrap();

    let mut restored = MappingStore::in_memory();
    let summary = restored.import(&mappings_doc).unwrap();
    assert_eq!(summary.mappings, 3);
    assert_eq!(summary.skipped, 0);
    let summary = restored.import(&buttons_doc).unwrap();
    assert_eq!(summary.buttons, 2);

    for entry in store.mapping_entries() {
        assert_eq!(restored.lookup(entry.key), Some(entry.function));
    }
    let names: Vec<_> = restored
        .custom_buttons()
        .iter()
        .map(|b| b.name.clone())
        .collect();
    assert_eq!(names, vec!["Iris Fader", "Key Light"]);
    assert_eq!(restored.buttons_for_control(21)[0].value, Some(5.6));
}

#[test]
fn test_import_replaces_state_wholesale() {
    let mut store = populated_store();
    let doc = serde_json::json!({
        "version": "1.0",
        "timestamp": "2026-01-01T00:00:00Z",
        "mappings": [
            {"midiCommand": "176-40", "function": "tint", "description": ""}
        ],
        "settings": {"channel": 3, "sensitivity": "high", "learnMode": true}
    });
    store.import(&doc).unwrap();

    assert_eq!(store.mapping_count(), 1);
    assert_eq!(
        store.lookup(ControlKey::new(0xB0, 40)),
        Some(CameraFunction::Tint)
    );
    // Old mappings are gone, custom buttons untouched
    assert_eq!(store.lookup(ControlKey::new(0x90, 36)), None);
    assert_eq!(store.custom_buttons().len(), 2);
    assert_eq!(
        store.settings(),
        &PanelSettings {
            channel: 3,
            sensitivity: Sensitivity::High,
            learn_mode: true,
        }
    );
}

#[test]
fn test_import_without_version_still_loads() {
    let mut store = MappingStore::in_memory();
    let doc = serde_json::json!({
        "mappings": [
            {"midiCommand": "144-60", "function": "focus"}
        ]
    });
    let summary = store.import(&doc).unwrap();
    assert_eq!(summary.mappings, 1);
}
