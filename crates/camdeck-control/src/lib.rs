//! camdeck control runtime
//!
//! Connects a MIDI control surface to a networked camera: decodes input,
//! runs the learn workflow, dispatches mapped functions over the camera's
//! REST API and exposes the whole thing to the browser panel through an
//! axum web API with a websocket event feed.

#![allow(missing_docs)]

pub mod camera;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod learn;
pub mod manager;
pub mod midi;
pub mod web;

pub use camera::{CameraClient, CameraCommand, CameraTransport};
pub use dispatch::CommandDispatcher;
pub use error::{ControlError, Result};
pub use events::{CancelReason, ControlEvent, EventBus, LearnTarget};
pub use learn::{AssignmentWorkflow, CaptureOutcome, LearnSession, LEARN_TIMEOUT};
pub use manager::{ButtonDraft, ControlManager};
pub use midi::input::MidiInputRegistry;
pub use midi::MidiEvent;
pub use web::{WebServer, WebServerConfig};
