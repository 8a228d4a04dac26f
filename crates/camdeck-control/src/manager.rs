//! Control manager
//!
//! Owns the mapping store, the learn workflow, the MIDI registry and the
//! dispatcher, and runs the single router task that drains the MIDI channel.
//! Everything the web API and the binary do goes through this type.

use std::sync::Arc;

use camdeck_core::{
    CameraFunction, CustomButton, CustomButtonExport, DeviceInfo, ImportSummary, MappingEntry,
    MappingExport, MappingStore, PanelSettings,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

use crate::camera::CameraTransport;
use crate::dispatch::CommandDispatcher;
use crate::error::{ControlError, Result};
use crate::events::{CancelReason, ControlEvent, EventBus, LearnTarget};
use crate::learn::{AssignmentWorkflow, CaptureOutcome, LEARN_TIMEOUT};
use crate::midi::input::MidiInputRegistry;
use crate::midi::MidiEvent;

/// Custom button fields as submitted by the panel.
#[derive(Debug, Clone)]
pub struct ButtonDraft {
    /// Existing button id when editing, absent when creating
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Function the button triggers
    pub function: CameraFunction,
    /// Fixed value override
    pub value: Option<f64>,
    /// Explicit controller number binding
    pub cc: Option<u8>,
}

/// Shared control runtime.
pub struct ControlManager {
    store: Mutex<MappingStore>,
    workflow: Mutex<AssignmentWorkflow>,
    registry: Mutex<MidiInputRegistry>,
    // Mirror of the registry's open device, readable without touching midir.
    device: Mutex<Option<DeviceInfo>>,
    dispatcher: Arc<CommandDispatcher>,
    events: EventBus,
    midi_tx: UnboundedSender<Vec<u8>>,
    midi_rx: Mutex<Option<UnboundedReceiver<Vec<u8>>>>,
}

impl ControlManager {
    /// Build the runtime around a loaded store and a camera transport.
    pub fn new(store: MappingStore, transport: Arc<dyn CameraTransport>) -> Arc<Self> {
        let events = EventBus::default();
        let (midi_tx, midi_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            store: Mutex::new(store),
            workflow: Mutex::new(AssignmentWorkflow::new()),
            registry: Mutex::new(MidiInputRegistry::new()),
            device: Mutex::new(None),
            dispatcher: Arc::new(CommandDispatcher::new(transport, events.clone())),
            events,
            midi_tx,
            midi_rx: Mutex::new(Some(midi_rx)),
        })
    }

    /// Handle to the event bus.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// Spawn the router task. Call once after construction; subsequent calls
    /// are no-ops.
    pub async fn start(self: &Arc<Self>) {
        let Some(mut rx) = self.midi_rx.lock().await.take() else {
            return;
        };
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                if let Some(event) = MidiEvent::from_bytes(&bytes) {
                    manager.handle_midi(event).await;
                }
            }
        });
    }

    /// Route one decoded MIDI event: learn capture first, then mapping and
    /// custom button dispatch. Runs to completion before the next event is
    /// taken, so ordering is preserved; only the camera calls are spawned.
    pub async fn handle_midi(self: &Arc<Self>, event: MidiEvent) {
        self.events.emit(ControlEvent::MidiActivity {
            status: event.status,
            control: event.control,
            value: event.value,
        });

        let outcome = self.workflow.lock().await.capture(event.key());
        match outcome {
            Some(CaptureOutcome::Commit { function, key }) => {
                self.store.lock().await.set_mapping(key, function);
                self.events.emit(ControlEvent::LearnCaptured {
                    target: LearnTarget::Function { function },
                    key,
                });
                self.events.emit(ControlEvent::MappingsChanged);
                return;
            }
            Some(CaptureOutcome::Park { target, key }) => {
                self.events.emit(ControlEvent::LearnCaptured { target, key });
                return;
            }
            None => {}
        }

        let live = f64::from(event.value);
        let store = self.store.lock().await;
        if let Some(function) = store.lookup(event.key()) {
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move {
                dispatcher.dispatch(function, live, None).await;
            });
        }
        for button in store.buttons_for_control(event.control) {
            let dispatcher = Arc::clone(&self.dispatcher);
            let function = button.function;
            let fixed = button.value;
            tokio::spawn(async move {
                dispatcher.dispatch(function, live, fixed).await;
            });
        }
    }

    // --- MIDI devices ---

    /// Enumerate available MIDI input ports.
    pub async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        self.registry.lock().await.list_devices()
    }

    /// Open a MIDI input port by id.
    pub async fn connect_device(&self, id: &str) -> Result<DeviceInfo> {
        let device = self
            .registry
            .lock()
            .await
            .connect(id, self.midi_tx.clone())?;
        *self.device.lock().await = Some(device.clone());
        self.events.emit(ControlEvent::DeviceConnected {
            device: device.clone(),
        });
        Ok(device)
    }

    /// Close the open MIDI input. Any pending learn session is cancelled.
    pub async fn disconnect_device(&self) {
        self.registry.lock().await.disconnect();
        let Some(device) = self.device.lock().await.take() else {
            return;
        };
        if let Some(session) = self.workflow.lock().await.cancel() {
            self.events.emit(ControlEvent::LearnCancelled {
                target: session.target,
                reason: CancelReason::DeviceLost,
            });
        }
        self.events.emit(ControlEvent::DeviceDisconnected {
            device_id: device.id,
        });
    }

    /// The MIDI device currently open, if any.
    pub async fn connected_device(&self) -> Option<DeviceInfo> {
        self.device.lock().await.clone()
    }

    // --- Camera ---

    /// Probe and connect the camera at `address`.
    pub async fn connect_camera(&self, address: &str) -> Result<()> {
        self.dispatcher.transport().connect(address).await?;
        self.events.emit(ControlEvent::CameraConnected {
            address: address.to_string(),
        });
        Ok(())
    }

    /// Drop the camera session.
    pub async fn disconnect_camera(&self) {
        self.dispatcher.transport().disconnect().await;
        self.events.emit(ControlEvent::CameraDisconnected);
    }

    /// Whether a camera session is active.
    pub fn camera_connected(&self) -> bool {
        self.dispatcher.transport().is_connected()
    }

    // --- Learn workflow ---

    /// Start capturing a control for `function`.
    pub async fn start_function_learn(self: &Arc<Self>, function: CameraFunction) -> Result<()> {
        self.start_learn(LearnTarget::Function { function }).await
    }

    /// Start capturing a controller number for a custom button edit.
    pub async fn start_button_learn(self: &Arc<Self>, button_id: Option<String>) -> Result<()> {
        self.start_learn(LearnTarget::Button { button_id }).await
    }

    async fn start_learn(self: &Arc<Self>, target: LearnTarget) -> Result<()> {
        if self.device.lock().await.is_none() {
            return Err(ControlError::NoDeviceConnected);
        }

        let (token, superseded) = self.workflow.lock().await.begin(target.clone());
        if let Some(previous) = superseded {
            self.events.emit(ControlEvent::LearnCancelled {
                target: previous.target,
                reason: CancelReason::Superseded,
            });
        }
        self.events.emit(ControlEvent::LearnStarted {
            target: target.clone(),
        });

        // The timer only cancels the session it was armed for; a newer
        // session carries a newer token and is left alone.
        let manager = Arc::clone(self);
        let timeout = tokio::time::sleep(LEARN_TIMEOUT);
        tokio::spawn(async move {
            timeout.await;
            let cancelled = manager.workflow.lock().await.cancel_if_token(token);
            if let Some(session) = cancelled {
                tracing::info!("learn session timed out");
                manager.events.emit(ControlEvent::LearnCancelled {
                    target: session.target,
                    reason: CancelReason::Timeout,
                });
            }
        });
        Ok(())
    }

    /// Cancel the pending learn session, if any.
    pub async fn cancel_learn(&self) {
        if let Some(session) = self.workflow.lock().await.cancel() {
            self.events.emit(ControlEvent::LearnCancelled {
                target: session.target,
                reason: CancelReason::Explicit,
            });
        }
    }

    /// Whether a learn session is waiting for input.
    pub async fn learn_active(&self) -> bool {
        self.workflow.lock().await.is_active()
    }

    // --- Mappings ---

    /// Snapshot of the mapping table, sorted by control identity.
    pub async fn mapping_entries(&self) -> Vec<MappingEntry> {
        self.store.lock().await.mapping_entries()
    }

    /// Remove the mapping bound to `function`. Returns whether one existed.
    pub async fn clear_mapping(&self, function: CameraFunction) -> bool {
        let cleared = self.store.lock().await.clear_mapping(function);
        if cleared {
            self.events.emit(ControlEvent::MappingsChanged);
        }
        cleared
    }

    /// Remove all mappings.
    pub async fn clear_all_mappings(&self) {
        self.store.lock().await.clear_all();
        self.events.emit(ControlEvent::MappingsChanged);
    }

    // --- Custom buttons ---

    /// Snapshot of the custom buttons, sorted by name.
    pub async fn custom_buttons(&self) -> Vec<CustomButton> {
        self.store
            .lock()
            .await
            .custom_buttons()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Create or update a custom button. A controller captured by a custom
    /// learn for this same edit takes precedence over the draft's explicit
    /// `cc`; captures parked for other edits are left untouched.
    pub async fn save_button(&self, draft: ButtonDraft) -> Result<CustomButton> {
        let captured = self
            .workflow
            .lock()
            .await
            .take_pending_capture(draft.id.as_deref());
        let cc = captured.map(|key| key.number).or(draft.cc);

        let button = match draft.id {
            Some(id) => CustomButton {
                id,
                name: draft.name,
                function: draft.function,
                value: draft.value,
                cc,
            },
            None => {
                let mut button = CustomButton::new(&draft.name, draft.function);
                button.value = draft.value;
                button.cc = cc;
                button
            }
        };

        let mut store = self.store.lock().await;
        store.upsert_custom_button(button.clone())?;
        let saved = store
            .custom_button(&button.id)
            .cloned()
            .unwrap_or(button);
        drop(store);

        self.events.emit(ControlEvent::MappingsChanged);
        Ok(saved)
    }

    /// Delete a custom button by id.
    pub async fn delete_button(&self, id: &str) {
        self.store.lock().await.delete_custom_button(id);
        self.events.emit(ControlEvent::MappingsChanged);
    }

    // --- Settings ---

    /// Current panel settings.
    pub async fn settings(&self) -> PanelSettings {
        self.store.lock().await.settings().clone()
    }

    /// Replace the panel settings and flush them.
    pub async fn update_settings(&self, settings: PanelSettings) {
        self.store.lock().await.set_settings(settings);
    }

    // --- Export / import ---

    /// Export the mapping set, stamped with the connected device.
    pub async fn export_mappings(&self) -> MappingExport {
        let device = self.connected_device().await;
        self.store.lock().await.export_mappings(device)
    }

    /// Export the custom button set.
    pub async fn export_buttons(&self) -> CustomButtonExport {
        self.store.lock().await.export_custom_buttons()
    }

    /// Import a previously exported document.
    pub async fn import(&self, document: &serde_json::Value) -> Result<ImportSummary> {
        let summary = self.store.lock().await.import(document)?;
        self.events.emit(ControlEvent::MappingsChanged);
        Ok(summary)
    }
}
