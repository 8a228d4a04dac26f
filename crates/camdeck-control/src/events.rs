//! Control event bus
//!
//! Everything observable in the runtime is announced as a [`ControlEvent`] on
//! a broadcast channel. The websocket endpoint forwards these to the browser
//! panel as JSON; components fire and forget.

use camdeck_core::{CameraFunction, ControlKey, DeviceInfo};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What a learn session is capturing for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LearnTarget {
    /// Binding a MIDI control to a camera function
    #[serde(rename_all = "camelCase")]
    Function {
        /// The function being bound
        function: CameraFunction,
    },
    /// Capturing a controller number for a custom button edit
    #[serde(rename_all = "camelCase")]
    Button {
        /// Button id when editing an existing button, absent for a new one
        #[serde(skip_serializing_if = "Option::is_none")]
        button_id: Option<String>,
    },
}

/// Why a learn session ended without a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelReason {
    /// 10 second capture window elapsed
    Timeout,
    /// A new learn session replaced this one
    Superseded,
    /// Cancelled by the operator
    Explicit,
    /// The MIDI device went away mid-session
    DeviceLost,
}

/// Runtime notifications broadcast to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlEvent {
    /// A MIDI input was opened
    #[serde(rename_all = "camelCase")]
    DeviceConnected {
        /// The opened device
        device: DeviceInfo,
    },
    /// The MIDI input was closed
    #[serde(rename_all = "camelCase")]
    DeviceDisconnected {
        /// Id of the closed device
        device_id: String,
    },
    /// Raw MIDI activity, for the panel's monitor view
    #[serde(rename_all = "camelCase")]
    MidiActivity {
        /// Status byte
        status: u8,
        /// Controller or note number
        control: u8,
        /// Velocity or controller value
        value: u8,
    },
    /// A learn session started and is waiting for input
    #[serde(rename_all = "camelCase")]
    LearnStarted {
        /// What the session will bind
        target: LearnTarget,
    },
    /// A learn session captured a control
    #[serde(rename_all = "camelCase")]
    LearnCaptured {
        /// What the session was binding
        target: LearnTarget,
        /// The captured control identity
        key: ControlKey,
    },
    /// A learn session ended without capturing
    #[serde(rename_all = "camelCase")]
    LearnCancelled {
        /// What the session was binding
        target: LearnTarget,
        /// Why it ended
        reason: CancelReason,
    },
    /// The mapping set or custom button set changed
    MappingsChanged,
    /// A camera command was sent
    #[serde(rename_all = "camelCase")]
    CommandDispatched {
        /// The executed function
        function: CameraFunction,
        /// Effective value the command was resolved from
        value: f64,
    },
    /// A camera command failed after dispatch
    #[serde(rename_all = "camelCase")]
    DispatchFailed {
        /// The function that failed
        function: CameraFunction,
        /// Failure detail
        message: String,
    },
    /// A command arrived while no camera session was active
    #[serde(rename_all = "camelCase")]
    CameraNotConnected {
        /// The dropped function
        function: CameraFunction,
    },
    /// A camera session was opened
    #[serde(rename_all = "camelCase")]
    CameraConnected {
        /// Camera address
        address: String,
    },
    /// The camera session was closed
    CameraDisconnected,
}

/// Broadcast sender for [`ControlEvent`]s.
///
/// Cheap to clone; lagging or absent receivers never block emitters.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ControlEvent>,
}

impl EventBus {
    /// Create a bus with the given buffered event capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event. Dropped silently when nobody is listening.
    pub fn emit(&self, event: ControlEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ControlEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
