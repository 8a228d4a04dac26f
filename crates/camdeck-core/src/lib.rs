//! camdeck core - domain model for the camera control panel
//!
//! This crate contains the persistent side of the MIDI mapping system:
//! - Camera function enumeration and control identities
//! - The mapping store (function mappings + custom buttons)
//! - Versioned export/import and state file formats
//! - Store error types

#![warn(missing_docs)]

pub mod button;
pub mod control;
pub mod document;
pub mod error;
pub mod function;
pub mod store;

pub use button::CustomButton;
pub use control::{ControlKey, InvalidControlKey};
pub use document::{
    CustomButtonExport, DeviceInfo, MappingEntry, MappingExport, MappingExportEntry,
    PanelSettings, Sensitivity, DOCUMENT_VERSION, MAX_STATE_FILE_SIZE,
};
pub use error::{Result, StoreError};
pub use function::{CameraFunction, UnknownFunction};
pub use store::{ImportSummary, MappingStore};
