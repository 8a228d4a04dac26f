//! Custom buttons
//!
//! A custom button is a user-defined, named binding from one MIDI controller
//! number to a camera function, optionally carrying a fixed value that
//! overrides whatever the controller reports.

use crate::error::StoreError;
use crate::function::CameraFunction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, parameterized command binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomButton {
    /// Opaque unique id
    pub id: String,
    /// Display name, unique across buttons
    pub name: String,
    /// Camera function this button invokes
    pub function: CameraFunction,
    /// Fixed value override; `None` passes the live MIDI value through
    #[serde(default)]
    pub value: Option<f64>,
    /// Assigned controller number, if any
    #[serde(default)]
    pub cc: Option<u8>,
}

impl CustomButton {
    /// Create a new unsaved button with a generated id.
    pub fn new(name: impl Into<String>, function: CameraFunction) -> Self {
        Self {
            id: format!("custom-{}", Uuid::new_v4()),
            name: name.into(),
            function,
            value: None,
            cc: None,
        }
    }

    /// Check the shape constraints that gate a save.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.id.is_empty() {
            return Err(StoreError::Validation("button id is empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("button name is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_button_gets_unique_id() {
        let a = CustomButton::new("Key Light", CameraFunction::Light8Db);
        let b = CustomButton::new("Key Light", CameraFunction::Light8Db);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("custom-"));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut button = CustomButton::new("", CameraFunction::Gain);
        assert!(button.validate().is_err());
        button.name = "   ".into();
        assert!(button.validate().is_err());
        button.name = "Fader".into();
        assert!(button.validate().is_ok());
    }

    #[test]
    fn test_serde_defaults_for_optional_fields() {
        let json = r#"{"id":"custom-1","name":"Rec","function":"record-toggle"}"#;
        let button: CustomButton = serde_json::from_str(json).unwrap();
        assert_eq!(button.value, None);
        assert_eq!(button.cc, None);
    }
}
