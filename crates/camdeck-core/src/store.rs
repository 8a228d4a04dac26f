//! Mapping store
//!
//! Owns the two process-wide collections: the function mapping set
//! (control identity → camera function) and the custom button set. Every
//! mutation flushes to the backing state file; flush failures are logged and
//! the in-memory state stays authoritative for the session.

use crate::button::CustomButton;
use crate::control::ControlKey;
use crate::document::{
    CustomButtonExport, DeviceInfo, MappingEntry, MappingExport, MappingExportEntry,
    PanelSettings, DOCUMENT_VERSION, MAX_STATE_FILE_SIZE,
};
use crate::error::{Result, StoreError};
use crate::function::CameraFunction;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// On-disk shape of the state file. Entry lists are written typed but read
/// back as raw values so one malformed entry never poisons the whole load.
#[derive(Debug, Serialize)]
struct StateFile {
    version: String,
    mappings: Vec<MappingEntry>,
    #[serde(rename = "customButtons")]
    custom_buttons: Vec<CustomButton>,
    settings: PanelSettings,
}

#[derive(Debug, Deserialize)]
struct RawStateFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    mappings: Vec<Value>,
    #[serde(default, rename = "customButtons")]
    custom_buttons: Vec<Value>,
    #[serde(default)]
    settings: Option<PanelSettings>,
}

/// Outcome of an import, for reporting back to the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Mapping entries accepted
    pub mappings: usize,
    /// Custom buttons accepted
    pub buttons: usize,
    /// Entries dropped for failing shape validation
    pub skipped: usize,
}

/// Persistent store for function mappings and custom buttons.
pub struct MappingStore {
    mappings: HashMap<ControlKey, CameraFunction>,
    buttons: HashMap<String, CustomButton>,
    settings: PanelSettings,
    path: Option<PathBuf>,
}

impl MappingStore {
    /// Create an empty store with no backing file. Used by tests and by the
    /// daemon when persistence is disabled.
    pub fn in_memory() -> Self {
        Self {
            mappings: HashMap::new(),
            buttons: HashMap::new(),
            settings: PanelSettings::default(),
            path: None,
        }
    }

    /// Open a store backed by `path`, loading any existing state.
    ///
    /// A missing file yields an empty store. Entries failing shape validation
    /// are dropped with a warning; a corrupt file is treated as empty rather
    /// than refusing to start.
    pub fn load(path: PathBuf) -> Result<Self> {
        let mut store = Self::in_memory();
        store.path = Some(path.clone());

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file yet, starting empty");
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };
        let size = metadata.len();
        if size > MAX_STATE_FILE_SIZE {
            return Err(StoreError::FileTooLarge {
                size,
                limit: MAX_STATE_FILE_SIZE,
            });
        }

        let content = fs::read_to_string(&path)?;
        let raw: RawStateFile = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "State file unreadable, starting empty");
                return Ok(store);
            }
        };

        if raw.version.as_deref() != Some(DOCUMENT_VERSION) {
            warn!(
                version = ?raw.version,
                "State file version differs from {DOCUMENT_VERSION}, loading anyway"
            );
        }

        let mut dropped = 0usize;
        for value in raw.mappings {
            match serde_json::from_value::<MappingEntry>(value) {
                Ok(entry) => {
                    store.mappings.insert(entry.key, entry.function);
                }
                Err(e) => {
                    dropped += 1;
                    warn!(error = %e, "Dropping malformed mapping entry");
                }
            }
        }
        for value in raw.custom_buttons {
            match serde_json::from_value::<CustomButton>(value) {
                Ok(button) if button.validate().is_ok() => {
                    store.buttons.insert(button.id.clone(), button);
                }
                Ok(button) => {
                    dropped += 1;
                    warn!(id = %button.id, "Dropping invalid custom button");
                }
                Err(e) => {
                    dropped += 1;
                    warn!(error = %e, "Dropping malformed custom button entry");
                }
            }
        }
        if let Some(settings) = raw.settings {
            store.settings = settings;
        }

        info!(
            mappings = store.mappings.len(),
            buttons = store.buttons.len(),
            dropped,
            "Loaded MIDI state"
        );
        Ok(store)
    }

    /// Write the current state to the backing file.
    ///
    /// Failures are logged and swallowed: persistence errors never invalidate
    /// the in-memory state or abort the calling operation.
    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let file = StateFile {
            version: DOCUMENT_VERSION.to_string(),
            mappings: self.mapping_entries(),
            custom_buttons: self.custom_buttons().into_iter().cloned().collect(),
            settings: self.settings.clone(),
        };
        let result = serde_json::to_string_pretty(&file)
            .map_err(StoreError::from)
            .and_then(|json| fs::write(path, json).map_err(StoreError::from));
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to flush MIDI state");
        }
    }

    // --- Function mappings ---

    /// Bind a control to a function, replacing any prior binding under the
    /// same key. Other keys already bound to the same function are left in
    /// place.
    pub fn set_mapping(&mut self, key: ControlKey, function: CameraFunction) {
        self.mappings.insert(key, function);
        self.flush();
    }

    /// Resolve the function bound to a control, if any.
    pub fn lookup(&self, key: ControlKey) -> Option<CameraFunction> {
        self.mappings.get(&key).copied()
    }

    /// Remove one binding for `function`. When several keys alias the same
    /// function only the first found is removed. Returns whether anything was
    /// removed.
    pub fn clear_mapping(&mut self, function: CameraFunction) -> bool {
        let key = self
            .mappings
            .iter()
            .find(|(_, f)| **f == function)
            .map(|(k, _)| *k);
        match key {
            Some(key) => {
                self.mappings.remove(&key);
                self.flush();
                true
            }
            None => false,
        }
    }

    /// Remove every function mapping. Idempotent.
    pub fn clear_all(&mut self) {
        self.mappings.clear();
        self.flush();
    }

    /// Number of function mappings.
    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    /// All mapping entries, sorted by key for stable output.
    pub fn mapping_entries(&self) -> Vec<MappingEntry> {
        let mut entries: Vec<_> = self
            .mappings
            .iter()
            .map(|(key, function)| MappingEntry {
                key: *key,
                function: *function,
            })
            .collect();
        entries.sort_by_key(|e| (e.key.status, e.key.number));
        entries
    }

    // --- Custom buttons ---

    /// Insert or update a custom button.
    ///
    /// Rejects an empty name and a name already used by a *different*
    /// button. On update the previously assigned controller number is kept
    /// unless the incoming button carries a new one.
    pub fn upsert_custom_button(&mut self, mut button: CustomButton) -> Result<()> {
        button.validate()?;
        let name = button.name.trim().to_string();
        if self
            .buttons
            .values()
            .any(|other| other.id != button.id && other.name == name)
        {
            return Err(StoreError::Validation(format!(
                "a button named \"{name}\" already exists"
            )));
        }
        button.name = name;
        if let Some(existing) = self.buttons.get(&button.id) {
            if button.cc.is_none() {
                button.cc = existing.cc;
            }
        }
        self.buttons.insert(button.id.clone(), button);
        self.flush();
        Ok(())
    }

    /// Delete a button by id. Unknown ids log a warning and are otherwise
    /// ignored.
    pub fn delete_custom_button(&mut self, id: &str) {
        if self.buttons.remove(id).is_none() {
            warn!(id, "Tried to delete a custom button that does not exist");
            return;
        }
        self.flush();
    }

    /// Look up a button by id.
    pub fn custom_button(&self, id: &str) -> Option<&CustomButton> {
        self.buttons.get(id)
    }

    /// All buttons, sorted by name.
    pub fn custom_buttons(&self) -> Vec<&CustomButton> {
        let mut buttons: Vec<_> = self.buttons.values().collect();
        buttons.sort_by(|a, b| a.name.cmp(&b.name));
        buttons
    }

    /// All buttons assigned to the given controller number.
    pub fn buttons_for_control(&self, cc: u8) -> Vec<&CustomButton> {
        let mut buttons: Vec<_> = self
            .buttons
            .values()
            .filter(|b| b.cc == Some(cc))
            .collect();
        buttons.sort_by(|a, b| a.name.cmp(&b.name));
        buttons
    }

    // --- Settings ---

    /// Current panel settings.
    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    /// Replace the panel settings.
    pub fn set_settings(&mut self, settings: PanelSettings) {
        self.settings = settings;
        self.flush();
    }

    // --- Export / import ---

    /// Build the versioned mapping export document.
    pub fn export_mappings(&self, device: Option<DeviceInfo>) -> MappingExport {
        MappingExport {
            version: DOCUMENT_VERSION.to_string(),
            timestamp: Utc::now(),
            device,
            mappings: self
                .mapping_entries()
                .into_iter()
                .map(|entry| MappingExportEntry {
                    midi_command: entry.key,
                    function: entry.function,
                    description: entry.function.description().to_string(),
                })
                .collect(),
            settings: self.settings.clone(),
        }
    }

    /// Build the versioned custom-button export document.
    pub fn export_custom_buttons(&self) -> CustomButtonExport {
        CustomButtonExport {
            version: DOCUMENT_VERSION.to_string(),
            timestamp: Utc::now(),
            custom_buttons: self.custom_buttons().into_iter().cloned().collect(),
        }
    }

    /// Import a previously exported document.
    ///
    /// Accepts either the mapping export or the custom-button export; the
    /// matching collection is replaced wholesale. Entries failing shape
    /// validation are skipped individually. A missing or unexpected version
    /// logs a compatibility warning without blocking the import.
    pub fn import(&mut self, document: &Value) -> Result<ImportSummary> {
        let Some(object) = document.as_object() else {
            return Err(StoreError::ImportFormat(
                "document is not a JSON object".into(),
            ));
        };

        match object.get("version").and_then(Value::as_str) {
            Some(DOCUMENT_VERSION) => {}
            version => warn!(?version, "Importing document with unexpected version"),
        }

        let mappings = object.get("mappings").and_then(Value::as_array);
        let buttons = object.get("customButtons").and_then(Value::as_array);
        if mappings.is_none() && buttons.is_none() {
            return Err(StoreError::ImportFormat(
                "document has neither \"mappings\" nor \"customButtons\"".into(),
            ));
        }

        let mut summary = ImportSummary::default();

        if let Some(entries) = mappings {
            self.mappings.clear();
            for value in entries {
                match serde_json::from_value::<MappingExportEntry>(value.clone()) {
                    Ok(entry) => {
                        self.mappings.insert(entry.midi_command, entry.function);
                        summary.mappings += 1;
                    }
                    Err(e) => {
                        summary.skipped += 1;
                        warn!(error = %e, "Skipping malformed mapping entry in import");
                    }
                }
            }
            if let Some(settings) = object.get("settings") {
                match serde_json::from_value::<PanelSettings>(settings.clone()) {
                    Ok(settings) => self.settings = settings,
                    Err(e) => warn!(error = %e, "Ignoring malformed settings in import"),
                }
            }
        }

        if let Some(entries) = buttons {
            self.buttons.clear();
            for value in entries {
                match serde_json::from_value::<CustomButton>(value.clone()) {
                    Ok(button) if button.validate().is_ok() => {
                        self.buttons.insert(button.id.clone(), button);
                        summary.buttons += 1;
                    }
                    _ => {
                        summary.skipped += 1;
                        warn!("Skipping malformed custom button in import");
                    }
                }
            }
        }

        self.flush();
        info!(
            mappings = summary.mappings,
            buttons = summary.buttons,
            skipped = summary.skipped,
            "Imported MIDI settings"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(status: u8, number: u8) -> ControlKey {
        ControlKey::new(status, number)
    }

    #[test]
    fn test_set_then_lookup() {
        let mut store = MappingStore::in_memory();
        store.set_mapping(key(0x90, 36), CameraFunction::RecordStart);
        assert_eq!(
            store.lookup(key(0x90, 36)),
            Some(CameraFunction::RecordStart)
        );
        assert_eq!(store.lookup(key(0x90, 37)), None);
    }

    #[test]
    fn test_overwrite_semantics() {
        let mut store = MappingStore::in_memory();
        store.set_mapping(key(0xB0, 7), CameraFunction::Gain);
        store.set_mapping(key(0xB0, 7), CameraFunction::Iris);
        assert_eq!(store.lookup(key(0xB0, 7)), Some(CameraFunction::Iris));
        assert_eq!(store.mapping_count(), 1);
    }

    #[test]
    fn test_clear_mapping_removes_one_alias() {
        let mut store = MappingStore::in_memory();
        store.set_mapping(key(0xB0, 7), CameraFunction::Gain);
        store.set_mapping(key(0xB0, 8), CameraFunction::Gain);
        assert!(store.clear_mapping(CameraFunction::Gain));
        assert_eq!(store.mapping_count(), 1);
        assert!(store.clear_mapping(CameraFunction::Gain));
        assert!(!store.clear_mapping(CameraFunction::Gain));
    }

    #[test]
    fn test_clear_all_idempotent() {
        let mut store = MappingStore::in_memory();
        store.set_mapping(key(0x90, 1), CameraFunction::RecordStop);
        store.clear_all();
        assert_eq!(store.mapping_count(), 0);
        store.clear_all();
        assert_eq!(store.mapping_count(), 0);
    }

    #[test]
    fn test_duplicate_button_name_rejected() {
        let mut store = MappingStore::in_memory();
        store
            .upsert_custom_button(CustomButton::new("Key Light", CameraFunction::Light8Db))
            .unwrap();
        let duplicate = CustomButton::new("Key Light", CameraFunction::Light4Db);
        let err = store.upsert_custom_button(duplicate).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.custom_buttons().len(), 1);
    }

    #[test]
    fn test_empty_button_name_rejected() {
        let mut store = MappingStore::in_memory();
        let err = store
            .upsert_custom_button(CustomButton::new("  ", CameraFunction::Gain))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.custom_buttons().is_empty());
    }

    #[test]
    fn test_update_preserves_assigned_cc() {
        let mut store = MappingStore::in_memory();
        let mut button = CustomButton::new("Fill", CameraFunction::Gain);
        button.cc = Some(20);
        let id = button.id.clone();
        store.upsert_custom_button(button).unwrap();

        // Edit without a fresh capture: cc stays
        let mut edited = store.custom_button(&id).unwrap().clone();
        edited.name = "Fill Light".into();
        edited.cc = None;
        store.upsert_custom_button(edited).unwrap();
        assert_eq!(store.custom_button(&id).unwrap().cc, Some(20));

        // Edit with a fresh capture: cc replaced
        let mut edited = store.custom_button(&id).unwrap().clone();
        edited.cc = Some(42);
        store.upsert_custom_button(edited).unwrap();
        assert_eq!(store.custom_button(&id).unwrap().cc, Some(42));
    }

    #[test]
    fn test_delete_unknown_button_is_harmless() {
        let mut store = MappingStore::in_memory();
        store.delete_custom_button("custom-nope");
        assert!(store.custom_buttons().is_empty());
    }

    #[test]
    fn test_buttons_for_control() {
        let mut store = MappingStore::in_memory();
        let mut a = CustomButton::new("A", CameraFunction::Light8Db);
        a.cc = Some(20);
        let mut b = CustomButton::new("B", CameraFunction::Gain);
        b.cc = Some(21);
        store.upsert_custom_button(a).unwrap();
        store.upsert_custom_button(b).unwrap();
        let hits = store.buttons_for_control(20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "A");
    }

    #[test]
    fn test_import_rejects_unrecognized_document() {
        let mut store = MappingStore::in_memory();
        let err = store.import(&serde_json::json!({"foo": 1})).unwrap_err();
        assert!(matches!(err, StoreError::ImportFormat(_)));
        let err = store.import(&serde_json::json!(42)).unwrap_err();
        assert!(matches!(err, StoreError::ImportFormat(_)));
    }

    #[test]
    fn test_import_skips_malformed_entries() {
        let mut store = MappingStore::in_memory();
        let doc = serde_json::json!({
            "version": "1.0",
            "mappings": [
                {"midiCommand": "144-36", "function": "record-start"},
                {"midiCommand": "not-a-key", "function": "record-stop"},
                {"function": "gain"},
            ],
        });
        let summary = store.import(&doc).unwrap();
        assert_eq!(summary.mappings, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(
            store.lookup(key(0x90, 36)),
            Some(CameraFunction::RecordStart)
        );
    }
}
