//! MIDI input device registry
//!
//! Wraps midir port enumeration and the single open input connection. Raw
//! messages are forwarded from the midir callback thread into an unbounded
//! channel drained by the router task, so decoding and mapping stay on one
//! task and events are handled in arrival order.

use camdeck_core::DeviceInfo;
use midir::{Ignore, MidiInput, MidiInputConnection};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{ControlError, Result};

const CLIENT_NAME: &str = "camdeck";

struct OpenInput {
    device: DeviceInfo,
    // Held only to keep the connection alive; closed on drop.
    _connection: MidiInputConnection<()>,
}

/// Registry over the host's MIDI input ports.
///
/// At most one port is open at a time. Opening a second port closes the
/// first.
#[derive(Default)]
pub struct MidiInputRegistry {
    open: Option<OpenInput>,
}

impl MidiInputRegistry {
    /// Create a registry with no open connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate the currently available input ports.
    pub fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let mut devices = Vec::new();
        for port in midi_in.ports() {
            let name = midi_in
                .port_name(&port)
                .unwrap_or_else(|_| "Unknown device".to_string());
            devices.push(DeviceInfo {
                id: port.id(),
                name,
                manufacturer: String::new(),
            });
        }
        Ok(devices)
    }

    /// Open the port with the given id and forward its raw messages into
    /// `sender`. Any previously open port is closed first.
    pub fn connect(&mut self, id: &str, sender: UnboundedSender<Vec<u8>>) -> Result<DeviceInfo> {
        self.disconnect();

        let mut midi_in = MidiInput::new(CLIENT_NAME)?;
        midi_in.ignore(Ignore::All);

        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| ControlError::DeviceNotFound(id.to_string()))?;

        let name = midi_in
            .port_name(&port)
            .unwrap_or_else(|_| "Unknown device".to_string());
        let device = DeviceInfo {
            id: id.to_string(),
            name: name.clone(),
            manufacturer: String::new(),
        };

        let connection = midi_in.connect(
            &port,
            "camdeck-input",
            move |_timestamp, bytes, _| {
                // The receiving side may already be gone during shutdown.
                let _ = sender.send(bytes.to_vec());
            },
            (),
        )?;

        tracing::info!(device = %name, "MIDI input connected");
        self.open = Some(OpenInput {
            device: device.clone(),
            _connection: connection,
        });
        Ok(device)
    }

    /// Close the open port, if any. Returns the device that was closed.
    pub fn disconnect(&mut self) -> Option<DeviceInfo> {
        let open = self.open.take()?;
        tracing::info!(device = %open.device.name, "MIDI input disconnected");
        Some(open.device)
    }

    /// The device currently open, if any.
    pub fn connected_device(&self) -> Option<&DeviceInfo> {
        self.open.as_ref().map(|open| &open.device)
    }

    /// Whether an input port is open.
    pub fn is_connected(&self) -> bool {
        self.open.is_some()
    }
}
