//! Command dispatcher
//!
//! Turns a mapped camera function plus a MIDI value into a wire command.
//! Discrete functions fire on presses only; continuous functions follow the
//! fader on every value including zero. Failures are announced on the event
//! bus and never propagate back into MIDI handling.

use std::sync::Arc;

use camdeck_core::CameraFunction;

use crate::camera::{CameraCommand, CameraTransport};
use crate::events::{ControlEvent, EventBus};

/// ISO step applied per iso-up / iso-down press, in dB of sensor gain.
const GAIN_STEP_DB: i32 = 2;
/// Shutter step applied per shutter-up / shutter-down press.
const SHUTTER_STEP: i32 = 50;
/// Normalised step applied per focus or zoom nudge.
const LENS_STEP: f64 = 0.1;

/// Map a 0-127 gain value onto the ISO range. Values above 127 are taken as
/// absolute ISO and passed through.
pub fn normalize_gain(value: f64) -> i32 {
    if value > 127.0 {
        value.round() as i32
    } else {
        100 + ((value / 127.0) * 25500.0).round() as i32
    }
}

/// Map a 0-127 tint value onto [-50, 50]. Values already in that range, or
/// above 127, are passed through.
pub fn normalize_tint(value: f64) -> i32 {
    if (-50.0..=50.0).contains(&value) {
        value.round() as i32
    } else if value <= 127.0 {
        ((value / 127.0 - 0.5) * 100.0).round() as i32
    } else {
        value.round() as i32
    }
}

/// Resolve a function and an effective value into a camera command.
pub fn resolve_command(function: CameraFunction, value: f64) -> CameraCommand {
    match function {
        CameraFunction::Gain => CameraCommand::SetIso(normalize_gain(value)),
        CameraFunction::Shutter => CameraCommand::SetShutter(value.round() as i32),
        CameraFunction::WhiteBalance => CameraCommand::SetWhiteBalance(value.round() as i32),
        CameraFunction::Tint => CameraCommand::SetTint(normalize_tint(value)),
        CameraFunction::Focus => CameraCommand::SetFocus(value),
        CameraFunction::Iris => CameraCommand::SetIris(value),
        CameraFunction::Autofocus => CameraCommand::TriggerAutofocus,
        CameraFunction::RecordStart => CameraCommand::SetRecording(true),
        CameraFunction::RecordStop => CameraCommand::SetRecording(false),
        CameraFunction::RecordToggle => CameraCommand::ToggleRecording,
        CameraFunction::IsoUp => CameraCommand::AdjustGainDb(GAIN_STEP_DB),
        CameraFunction::IsoDown => CameraCommand::AdjustGainDb(-GAIN_STEP_DB),
        CameraFunction::ShutterUp => CameraCommand::AdjustShutter(SHUTTER_STEP),
        CameraFunction::ShutterDown => CameraCommand::AdjustShutter(-SHUTTER_STEP),
        CameraFunction::FocusNear => CameraCommand::AdjustFocus(-LENS_STEP),
        CameraFunction::FocusFar => CameraCommand::AdjustFocus(LENS_STEP),
        CameraFunction::ZoomIn => CameraCommand::AdjustZoom(LENS_STEP),
        CameraFunction::ZoomOut => CameraCommand::AdjustZoom(-LENS_STEP),
        // Remaining variants are the fixed-gain family; the live value is
        // ignored for these.
        other => CameraCommand::SetGainDb(other.fixed_gain_db().unwrap_or(0)),
    }
}

/// Sends resolved commands to the camera transport.
pub struct CommandDispatcher {
    transport: Arc<dyn CameraTransport>,
    events: EventBus,
}

impl CommandDispatcher {
    /// Create a dispatcher over `transport`, reporting on `events`.
    pub fn new(transport: Arc<dyn CameraTransport>, events: EventBus) -> Self {
        Self { transport, events }
    }

    /// The underlying camera transport.
    pub fn transport(&self) -> &Arc<dyn CameraTransport> {
        &self.transport
    }

    /// Dispatch `function` for a live MIDI value.
    ///
    /// `fixed` is a custom button's configured value; when present it
    /// replaces `live` as the command input, but press gating still looks at
    /// the live value. Errors are emitted, not returned.
    pub async fn dispatch(&self, function: CameraFunction, live: f64, fixed: Option<f64>) {
        if !function.is_continuous() && live <= 0.0 {
            tracing::trace!(%function, "release ignored for discrete function");
            return;
        }
        if !self.transport.is_connected() {
            tracing::warn!(%function, "camera not connected, command dropped");
            self.events.emit(ControlEvent::CameraNotConnected { function });
            return;
        }

        let value = fixed.unwrap_or(live);
        let command = resolve_command(function, value);
        tracing::debug!(%function, value, ?command, "dispatching camera command");

        match self.transport.execute(command).await {
            Ok(()) => {
                self.events
                    .emit(ControlEvent::CommandDispatched { function, value });
            }
            Err(err) => {
                tracing::warn!(%function, error = %err, "camera command failed");
                self.events.emit(ControlEvent::DispatchFailed {
                    function,
                    message: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        connected: AtomicBool,
        fail: AtomicBool,
        commands: Mutex<Vec<CameraCommand>>,
    }

    impl RecordingTransport {
        fn connected() -> Arc<Self> {
            let transport = Self::default();
            transport.connected.store(true, Ordering::Relaxed);
            Arc::new(transport)
        }

        fn commands(&self) -> Vec<CameraCommand> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CameraTransport for RecordingTransport {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Relaxed)
        }

        async fn connect(&self, _address: &str) -> Result<()> {
            self.connected.store(true, Ordering::Relaxed);
            Ok(())
        }

        async fn disconnect(&self) {
            self.connected.store(false, Ordering::Relaxed);
        }

        async fn execute(&self, command: CameraCommand) -> Result<()> {
            if self.fail.load(Ordering::Relaxed) {
                return Err(crate::error::ControlError::DispatchFailure(
                    "HTTP 500 on /video/gain".into(),
                ));
            }
            self.commands.lock().unwrap().push(command);
            Ok(())
        }
    }

    #[test]
    fn test_gain_normalization_table() {
        assert_eq!(normalize_gain(0.0), 100);
        assert_eq!(normalize_gain(127.0), 25600);
        assert_eq!(normalize_gain(64.0), 100 + ((64.0 / 127.0) * 25500.0_f64).round() as i32);
        // Above the MIDI range the value is treated as absolute ISO.
        assert_eq!(normalize_gain(3200.0), 3200);
    }

    #[test]
    fn test_tint_normalization_table() {
        assert_eq!(normalize_tint(-50.0), -50);
        assert_eq!(normalize_tint(50.0), 50);
        assert_eq!(normalize_tint(0.0), 0);
        assert_eq!(normalize_tint(127.0), 50);
        assert_eq!(normalize_tint(100.0), 29);
        assert_eq!(normalize_tint(64.0), ((64.0 / 127.0 - 0.5) * 100.0_f64).round() as i32);
        assert_eq!(normalize_tint(200.0), 200);
    }

    #[test]
    fn test_fixed_gain_resolution_ignores_value() {
        assert_eq!(
            resolve_command(CameraFunction::Light8Db, 127.0),
            CameraCommand::SetGainDb(8)
        );
        assert_eq!(
            resolve_command(CameraFunction::Light0Db, 64.0),
            CameraCommand::SetGainDb(0)
        );
    }

    #[tokio::test]
    async fn test_discrete_release_not_dispatched() {
        let transport = RecordingTransport::connected();
        let dispatcher = CommandDispatcher::new(transport.clone(), EventBus::default());

        dispatcher
            .dispatch(CameraFunction::RecordStart, 0.0, None)
            .await;
        assert!(transport.commands().is_empty());

        dispatcher
            .dispatch(CameraFunction::RecordStart, 127.0, None)
            .await;
        assert_eq!(transport.commands(), vec![CameraCommand::SetRecording(true)]);
    }

    #[tokio::test]
    async fn test_continuous_executes_on_zero() {
        let transport = RecordingTransport::connected();
        let dispatcher = CommandDispatcher::new(transport.clone(), EventBus::default());

        dispatcher.dispatch(CameraFunction::Gain, 0.0, None).await;
        assert_eq!(transport.commands(), vec![CameraCommand::SetIso(100)]);
    }

    #[tokio::test]
    async fn test_fixed_value_overrides_live() {
        let transport = RecordingTransport::connected();
        let dispatcher = CommandDispatcher::new(transport.clone(), EventBus::default());

        dispatcher
            .dispatch(CameraFunction::Iris, 90.0, Some(5.6))
            .await;
        assert_eq!(transport.commands(), vec![CameraCommand::SetIris(5.6)]);
    }

    #[tokio::test]
    async fn test_fixed_value_does_not_bypass_press_gate() {
        let transport = RecordingTransport::connected();
        let dispatcher = CommandDispatcher::new(transport.clone(), EventBus::default());

        // Note-off on a discrete button with a fixed value still does nothing.
        dispatcher
            .dispatch(CameraFunction::RecordStop, 0.0, Some(1.0))
            .await;
        assert!(transport.commands().is_empty());
    }

    #[tokio::test]
    async fn test_not_connected_emits_warning_event() {
        let transport = Arc::new(RecordingTransport::default());
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let dispatcher = CommandDispatcher::new(transport.clone(), events);

        dispatcher
            .dispatch(CameraFunction::RecordStart, 127.0, None)
            .await;
        assert!(transport.commands().is_empty());
        assert!(matches!(
            rx.try_recv().unwrap(),
            ControlEvent::CameraNotConnected {
                function: CameraFunction::RecordStart,
            }
        ));
    }

    #[tokio::test]
    async fn test_failure_emits_dispatch_failed() {
        let transport = RecordingTransport::connected();
        transport.fail.store(true, Ordering::Relaxed);
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let dispatcher = CommandDispatcher::new(transport.clone(), events);

        dispatcher
            .dispatch(CameraFunction::Gain, 64.0, None)
            .await;
        match rx.try_recv().unwrap() {
            ControlEvent::DispatchFailed { function, message } => {
                assert_eq!(function, CameraFunction::Gain);
                assert!(message.contains("HTTP 500"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
