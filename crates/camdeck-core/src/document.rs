//! Persisted and exchanged document formats
//!
//! Defines the on-disk state file and the versioned export/import documents
//! for mappings and custom buttons. Field names mirror the files produced by
//! earlier releases of the control panel, so existing exports keep importing.

use crate::button::CustomButton;
use crate::control::ControlKey;
use crate::function::CameraFunction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stamped into export documents and the state file.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Maximum allowed state file size (10 MB).
///
/// Prevents unbounded resource consumption when loading the state file.
pub const MAX_STATE_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Identity of a MIDI input device, as listed by the device registry and
/// recorded in mapping exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Port id, stable for the session
    pub id: String,
    /// Port display name
    pub name: String,
    /// Manufacturer string, empty when the backend does not report one
    #[serde(default)]
    pub manufacturer: String,
}

/// MIDI input sensitivity preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// Coarse response
    Low,
    /// Default response
    #[default]
    Medium,
    /// Fine response
    High,
}

/// Panel-level MIDI settings carried alongside the mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSettings {
    /// MIDI channel filter (0 = all channels)
    #[serde(default)]
    pub channel: u8,
    /// Input sensitivity preset
    #[serde(default)]
    pub sensitivity: Sensitivity,
    /// Whether learn mode is active in the panel
    #[serde(default)]
    pub learn_mode: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            channel: 0,
            sensitivity: Sensitivity::Medium,
            learn_mode: false,
        }
    }
}

/// One mapping row in the state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Control identity
    pub key: ControlKey,
    /// Bound function
    pub function: CameraFunction,
}

/// One mapping row in the export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingExportEntry {
    /// Control identity ("status-number")
    #[serde(rename = "midiCommand")]
    pub midi_command: ControlKey,
    /// Bound function id
    pub function: CameraFunction,
    /// Human-readable description of the function
    #[serde(default)]
    pub description: String,
}

/// Export document for the function mapping set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingExport {
    /// Document format version
    pub version: String,
    /// Export time
    pub timestamp: DateTime<Utc>,
    /// Device the mappings were captured against, if one was connected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,
    /// Mapping rows
    pub mappings: Vec<MappingExportEntry>,
    /// Panel settings at export time
    pub settings: PanelSettings,
}

/// Export document for the custom button set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomButtonExport {
    /// Document format version
    pub version: String,
    /// Export time
    pub timestamp: DateTime<Utc>,
    /// Button rows
    #[serde(rename = "customButtons")]
    pub custom_buttons: Vec<CustomButton>,
}
