//! MIDI message decoding and device registry

pub mod input;

use camdeck_core::ControlKey;
use chrono::{DateTime, Utc};

/// A decoded MIDI message.
///
/// Ephemeral: carries the live value for dispatch but is never persisted.
/// Identity for mapping purposes is the [`ControlKey`] derived from the
/// status byte and the first data byte.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiEvent {
    /// Status byte (message kind + channel)
    pub status: u8,
    /// Note or controller number
    pub control: u8,
    /// Velocity or controller value
    pub value: u8,
    /// Decode time
    pub timestamp: DateTime<Utc>,
}

impl MidiEvent {
    /// Decode a raw MIDI message.
    ///
    /// Returns `None` for messages shorter than three bytes (clock, active
    /// sensing and the like). Data bytes outside the 7-bit range are passed
    /// through untouched; callers that care get debug assertions only.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }
        debug_assert!(bytes[0] >= 0x80, "status byte expected, got {:#x}", bytes[0]);
        debug_assert!(bytes[1] < 0x80, "data byte out of range: {:#x}", bytes[1]);
        Some(Self {
            status: bytes[0],
            control: bytes[1],
            value: bytes[2],
            timestamp: Utc::now(),
        })
    }

    /// The stable identity this event maps under.
    pub fn key(&self) -> ControlKey {
        ControlKey::new(self.status, self.control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_note_on() {
        let event = MidiEvent::from_bytes(&[0x90, 36, 127]).unwrap();
        assert_eq!(event.status, 0x90);
        assert_eq!(event.control, 36);
        assert_eq!(event.value, 127);
        assert_eq!(event.key(), ControlKey::new(0x90, 36));
    }

    #[test]
    fn test_decode_control_change() {
        let event = MidiEvent::from_bytes(&[0xB0, 7, 0]).unwrap();
        assert_eq!(event.key(), ControlKey::new(0xB0, 7));
        assert_eq!(event.value, 0);
    }

    #[test]
    fn test_short_messages_ignored() {
        assert!(MidiEvent::from_bytes(&[0xF8]).is_none());
        assert!(MidiEvent::from_bytes(&[0x90, 36]).is_none());
        assert!(MidiEvent::from_bytes(&[]).is_none());
    }

    #[test]
    fn test_extra_bytes_ignored() {
        let event = MidiEvent::from_bytes(&[0x90, 60, 100, 0x42]).unwrap();
        assert_eq!(event.control, 60);
        assert_eq!(event.value, 100);
    }

    #[test]
    fn test_channel_distinguishes_keys() {
        let ch0 = MidiEvent::from_bytes(&[0x90, 36, 1]).unwrap();
        let ch1 = MidiEvent::from_bytes(&[0x91, 36, 1]).unwrap();
        assert_ne!(ch0.key(), ch1.key());
    }
}
