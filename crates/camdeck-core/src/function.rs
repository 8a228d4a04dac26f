//! Camera function enumeration
//!
//! Every camera operation a MIDI control can be bound to. The string ids are
//! the stable wire/persistence identifiers and must not change: exported
//! mapping files reference them verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A camera operation addressable from a MIDI control.
///
/// Continuous functions represent fader/encoder positions and run on every
/// incoming value including zero. Discrete functions are button-like and only
/// fire on a press (value > 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraFunction {
    /// Start recording
    #[serde(rename = "record-start")]
    RecordStart,
    /// Stop recording
    #[serde(rename = "record-stop")]
    RecordStop,
    /// Toggle recording state
    #[serde(rename = "record-toggle")]
    RecordToggle,
    /// Continuous gain (ISO-scaled)
    #[serde(rename = "gain")]
    Gain,
    /// Continuous shutter speed
    #[serde(rename = "shutter")]
    Shutter,
    /// Continuous white balance (Kelvin)
    #[serde(rename = "whiteBalance")]
    WhiteBalance,
    /// Continuous white balance tint
    #[serde(rename = "tint")]
    Tint,
    /// Continuous lens focus (normalised)
    #[serde(rename = "focus")]
    Focus,
    /// Continuous iris aperture stop
    #[serde(rename = "iris")]
    Iris,
    /// One-shot autofocus trigger
    #[serde(rename = "autofocus")]
    Autofocus,
    /// Step ISO up
    #[serde(rename = "iso-up")]
    IsoUp,
    /// Step ISO down
    #[serde(rename = "iso-down")]
    IsoDown,
    /// Step shutter up
    #[serde(rename = "shutter-up")]
    ShutterUp,
    /// Step shutter down
    #[serde(rename = "shutter-down")]
    ShutterDown,
    /// Step focus nearer
    #[serde(rename = "focus-near")]
    FocusNear,
    /// Step focus farther
    #[serde(rename = "focus-far")]
    FocusFar,
    /// Step zoom in
    #[serde(rename = "zoom-in")]
    ZoomIn,
    /// Step zoom out
    #[serde(rename = "zoom-out")]
    ZoomOut,
    /// Fixed gain 0 dB
    #[serde(rename = "light0db")]
    Light0Db,
    /// Fixed gain 2 dB
    #[serde(rename = "light2db")]
    Light2Db,
    /// Fixed gain 4 dB
    #[serde(rename = "light4db")]
    Light4Db,
    /// Fixed gain 6 dB
    #[serde(rename = "light6db")]
    Light6Db,
    /// Fixed gain 8 dB
    #[serde(rename = "light8db")]
    Light8Db,
    /// Fixed gain 10 dB
    #[serde(rename = "light10db")]
    Light10Db,
    /// Fixed gain 12 dB
    #[serde(rename = "light12db")]
    Light12Db,
    /// Fixed gain 14 dB
    #[serde(rename = "light14db")]
    Light14Db,
    /// Fixed gain 16 dB
    #[serde(rename = "light16db")]
    Light16Db,
    /// Fixed gain 18 dB
    #[serde(rename = "light18db")]
    Light18Db,
    /// Fixed gain 20 dB
    #[serde(rename = "light20db")]
    Light20Db,
    /// Fixed gain 22 dB
    #[serde(rename = "light22db")]
    Light22Db,
    /// Fixed gain 24 dB
    #[serde(rename = "light24db")]
    Light24Db,
    /// Fixed gain 26 dB
    #[serde(rename = "light26db")]
    Light26Db,
}

impl CameraFunction {
    /// Every function, in display order.
    pub const ALL: &'static [CameraFunction] = &[
        CameraFunction::RecordStart,
        CameraFunction::RecordStop,
        CameraFunction::RecordToggle,
        CameraFunction::Gain,
        CameraFunction::Shutter,
        CameraFunction::WhiteBalance,
        CameraFunction::Tint,
        CameraFunction::Focus,
        CameraFunction::Iris,
        CameraFunction::Autofocus,
        CameraFunction::IsoUp,
        CameraFunction::IsoDown,
        CameraFunction::ShutterUp,
        CameraFunction::ShutterDown,
        CameraFunction::FocusNear,
        CameraFunction::FocusFar,
        CameraFunction::ZoomIn,
        CameraFunction::ZoomOut,
        CameraFunction::Light0Db,
        CameraFunction::Light2Db,
        CameraFunction::Light4Db,
        CameraFunction::Light6Db,
        CameraFunction::Light8Db,
        CameraFunction::Light10Db,
        CameraFunction::Light12Db,
        CameraFunction::Light14Db,
        CameraFunction::Light16Db,
        CameraFunction::Light18Db,
        CameraFunction::Light20Db,
        CameraFunction::Light22Db,
        CameraFunction::Light24Db,
        CameraFunction::Light26Db,
    ];

    /// Stable string id used in persisted mappings and export files.
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFunction::RecordStart => "record-start",
            CameraFunction::RecordStop => "record-stop",
            CameraFunction::RecordToggle => "record-toggle",
            CameraFunction::Gain => "gain",
            CameraFunction::Shutter => "shutter",
            CameraFunction::WhiteBalance => "whiteBalance",
            CameraFunction::Tint => "tint",
            CameraFunction::Focus => "focus",
            CameraFunction::Iris => "iris",
            CameraFunction::Autofocus => "autofocus",
            CameraFunction::IsoUp => "iso-up",
            CameraFunction::IsoDown => "iso-down",
            CameraFunction::ShutterUp => "shutter-up",
            CameraFunction::ShutterDown => "shutter-down",
            CameraFunction::FocusNear => "focus-near",
            CameraFunction::FocusFar => "focus-far",
            CameraFunction::ZoomIn => "zoom-in",
            CameraFunction::ZoomOut => "zoom-out",
            CameraFunction::Light0Db => "light0db",
            CameraFunction::Light2Db => "light2db",
            CameraFunction::Light4Db => "light4db",
            CameraFunction::Light6Db => "light6db",
            CameraFunction::Light8Db => "light8db",
            CameraFunction::Light10Db => "light10db",
            CameraFunction::Light12Db => "light12db",
            CameraFunction::Light14Db => "light14db",
            CameraFunction::Light16Db => "light16db",
            CameraFunction::Light18Db => "light18db",
            CameraFunction::Light20Db => "light20db",
            CameraFunction::Light22Db => "light22db",
            CameraFunction::Light24Db => "light24db",
            CameraFunction::Light26Db => "light26db",
        }
    }

    /// Whether this function tracks a fader/encoder position.
    ///
    /// Continuous functions execute on every received value including 0;
    /// everything else is press-gated.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            CameraFunction::Gain
                | CameraFunction::Iris
                | CameraFunction::Shutter
                | CameraFunction::WhiteBalance
                | CameraFunction::Tint
                | CameraFunction::Focus
        )
    }

    /// For the `lightNdb` family, the constant gain in dB this function
    /// dispatches regardless of the incoming MIDI value.
    pub fn fixed_gain_db(&self) -> Option<i32> {
        let db = match self {
            CameraFunction::Light0Db => 0,
            CameraFunction::Light2Db => 2,
            CameraFunction::Light4Db => 4,
            CameraFunction::Light6Db => 6,
            CameraFunction::Light8Db => 8,
            CameraFunction::Light10Db => 10,
            CameraFunction::Light12Db => 12,
            CameraFunction::Light14Db => 14,
            CameraFunction::Light16Db => 16,
            CameraFunction::Light18Db => 18,
            CameraFunction::Light20Db => 20,
            CameraFunction::Light22Db => 22,
            CameraFunction::Light24Db => 24,
            CameraFunction::Light26Db => 26,
            _ => return None,
        };
        Some(db)
    }

    /// Human-readable description, used by the mapping export format.
    pub fn description(&self) -> &'static str {
        match self {
            CameraFunction::RecordStart => "Start recording",
            CameraFunction::RecordStop => "Stop recording",
            CameraFunction::RecordToggle => "Toggle recording",
            CameraFunction::Gain => "Smooth gain (ISO) control",
            CameraFunction::Shutter => "Smooth shutter control",
            CameraFunction::WhiteBalance => "Smooth white balance control",
            CameraFunction::Tint => "Smooth tint control",
            CameraFunction::Focus => "Smooth focus control",
            CameraFunction::Iris => "Smooth iris control",
            CameraFunction::Autofocus => "Trigger autofocus",
            CameraFunction::IsoUp => "ISO up",
            CameraFunction::IsoDown => "ISO down",
            CameraFunction::ShutterUp => "Shutter up",
            CameraFunction::ShutterDown => "Shutter down",
            CameraFunction::FocusNear => "Focus nearer",
            CameraFunction::FocusFar => "Focus farther",
            CameraFunction::ZoomIn => "Zoom in",
            CameraFunction::ZoomOut => "Zoom out",
            CameraFunction::Light0Db => "Gain 0 dB",
            CameraFunction::Light2Db => "Gain 2 dB",
            CameraFunction::Light4Db => "Gain 4 dB",
            CameraFunction::Light6Db => "Gain 6 dB",
            CameraFunction::Light8Db => "Gain 8 dB",
            CameraFunction::Light10Db => "Gain 10 dB",
            CameraFunction::Light12Db => "Gain 12 dB",
            CameraFunction::Light14Db => "Gain 14 dB",
            CameraFunction::Light16Db => "Gain 16 dB",
            CameraFunction::Light18Db => "Gain 18 dB",
            CameraFunction::Light20Db => "Gain 20 dB",
            CameraFunction::Light22Db => "Gain 22 dB",
            CameraFunction::Light24Db => "Gain 24 dB",
            CameraFunction::Light26Db => "Gain 26 dB",
        }
    }
}

impl fmt::Display for CameraFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown function id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown camera function: {0}")]
pub struct UnknownFunction(pub String);

impl FromStr for CameraFunction {
    type Err = UnknownFunction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraFunction::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFunction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for f in CameraFunction::ALL {
            assert_eq!(f.as_str().parse::<CameraFunction>().unwrap(), *f);
        }
    }

    #[test]
    fn test_serde_uses_stable_ids() {
        let json = serde_json::to_string(&CameraFunction::WhiteBalance).unwrap();
        assert_eq!(json, "\"whiteBalance\"");

        let f: CameraFunction = serde_json::from_str("\"record-start\"").unwrap();
        assert_eq!(f, CameraFunction::RecordStart);

        let f: CameraFunction = serde_json::from_str("\"light8db\"").unwrap();
        assert_eq!(f, CameraFunction::Light8Db);
    }

    #[test]
    fn test_unknown_id_rejected() {
        assert!("saturation-boost".parse::<CameraFunction>().is_err());
        assert!(serde_json::from_str::<CameraFunction>("\"bogus\"").is_err());
    }

    #[test]
    fn test_continuous_set() {
        assert!(CameraFunction::Gain.is_continuous());
        assert!(CameraFunction::Tint.is_continuous());
        assert!(!CameraFunction::RecordStart.is_continuous());
        assert!(!CameraFunction::Light8Db.is_continuous());
    }

    #[test]
    fn test_fixed_gain_values() {
        assert_eq!(CameraFunction::Light0Db.fixed_gain_db(), Some(0));
        assert_eq!(CameraFunction::Light8Db.fixed_gain_db(), Some(8));
        assert_eq!(CameraFunction::Light26Db.fixed_gain_db(), Some(26));
        assert_eq!(CameraFunction::Gain.fixed_gain_db(), None);
    }
}
