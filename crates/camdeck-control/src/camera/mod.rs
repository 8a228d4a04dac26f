//! Camera transport layer

pub mod client;

pub use client::CameraClient;

use crate::error::Result;
use async_trait::async_trait;

/// A resolved camera operation, ready for the wire.
///
/// `Set*` commands carry final values. `Adjust*` commands are relative steps
/// that the transport resolves against the camera's current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Set sensor ISO
    SetIso(i32),
    /// Set sensor gain in dB
    SetGainDb(i32),
    /// Set shutter speed denominator
    SetShutter(i32),
    /// Set white balance in Kelvin
    SetWhiteBalance(i32),
    /// Set white balance tint
    SetTint(i32),
    /// Set normalised focus position
    SetFocus(f64),
    /// Set iris aperture stop
    SetIris(f64),
    /// Trigger one-shot autofocus
    TriggerAutofocus,
    /// Start or stop recording
    SetRecording(bool),
    /// Flip the recording state
    ToggleRecording,
    /// Step sensor gain by a dB delta, clamped to [0, 26]
    AdjustGainDb(i32),
    /// Step shutter speed, clamped to [50, 2000]
    AdjustShutter(i32),
    /// Step normalised focus, clamped to [0, 1]
    AdjustFocus(f64),
    /// Step normalised zoom, clamped to [0, 1]
    AdjustZoom(f64),
}

/// Seam between the dispatcher and the camera.
///
/// The production implementation is [`CameraClient`]; tests substitute a
/// recording stub.
#[async_trait]
pub trait CameraTransport: Send + Sync {
    /// Whether a camera session is active.
    fn is_connected(&self) -> bool;

    /// Probe the camera at `address` and open a session.
    async fn connect(&self, address: &str) -> Result<()>;

    /// Close the session, if one is open.
    async fn disconnect(&self);

    /// Execute a command against the connected camera.
    async fn execute(&self, command: CameraCommand) -> Result<()>;
}
