//! Control identity
//!
//! A [`ControlKey`] identifies one physical knob, pad or fader independent of
//! the value it currently reports. It is derived from the MIDI status byte
//! (command + channel) and the first data byte (note/controller number), so
//! the same controller number on different channels or command types yields
//! distinct keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identity of a physical MIDI control.
///
/// Serialized as `"<status>-<number>"` (decimal), matching the key format of
/// persisted mapping files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ControlKey {
    /// MIDI status byte (command nibble + channel nibble)
    pub status: u8,
    /// Note or controller number
    pub number: u8,
}

impl ControlKey {
    /// Build a key from a status byte and a note/controller number.
    pub fn new(status: u8, number: u8) -> Self {
        Self { status, number }
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.status, self.number)
    }
}

/// Error returned when parsing a malformed control key string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid control key: {0}")]
pub struct InvalidControlKey(pub String);

impl FromStr for ControlKey {
    type Err = InvalidControlKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (status, number) = s
            .split_once('-')
            .ok_or_else(|| InvalidControlKey(s.to_string()))?;
        let status = status
            .trim()
            .parse::<u8>()
            .map_err(|_| InvalidControlKey(s.to_string()))?;
        let number = number
            .trim()
            .parse::<u8>()
            .map_err(|_| InvalidControlKey(s.to_string()))?;
        Ok(ControlKey { status, number })
    }
}

impl From<ControlKey> for String {
    fn from(key: ControlKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for ControlKey {
    type Error = InvalidControlKey;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_string_round_trip() {
        let key = ControlKey::new(0x90, 36);
        assert_eq!(key.to_string(), "144-36");
        assert_eq!("144-36".parse::<ControlKey>().unwrap(), key);
    }

    #[test]
    fn test_serde_as_string() {
        let key = ControlKey::new(0xB0, 7);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"176-7\"");
        let back: ControlKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_malformed_keys_rejected() {
        assert!("".parse::<ControlKey>().is_err());
        assert!("144".parse::<ControlKey>().is_err());
        assert!("144-abc".parse::<ControlKey>().is_err());
        assert!("999-0".parse::<ControlKey>().is_err());
    }

    #[test]
    fn test_channel_distinguishes_keys() {
        // Same controller number, different channel/command byte
        let a = ControlKey::new(0xB0, 20);
        let b = ControlKey::new(0xB1, 20);
        let c = ControlKey::new(0x90, 20);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
