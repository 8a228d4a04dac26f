//! Error types for the control runtime
use thiserror::Error;

/// Control runtime errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// No MIDI input is open; learn and capture operations require one
    #[error("No MIDI device connected")]
    NoDeviceConnected,

    /// Requested MIDI port does not exist (unplugged or stale id)
    #[error("MIDI device not found: {0}")]
    DeviceNotFound(String),

    /// MIDI connection error
    #[error("MIDI connection error: {0}")]
    MidiConnectionError(#[from] midir::ConnectError<midir::MidiInput>),

    /// MIDI initialization error
    #[error("MIDI init error: {0}")]
    MidiInitError(#[from] midir::InitError),

    /// No camera session is active
    #[error("Camera not connected")]
    NotConnected,

    /// Camera accepted the connection but rejected the command
    #[error("Camera dispatch failed: {0}")]
    DispatchFailure(String),

    /// HTTP transport error talking to the camera
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Mapping store error
    #[error(transparent)]
    StoreError(#[from] camdeck_core::StoreError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
