//! HTTP request and response types

use axum::http::StatusCode;
use axum::response::Json;
use camdeck_core::{CameraFunction, ControlKey, DeviceInfo, StoreError};
use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Error half of a handler result: status code plus enveloped message.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Build an [`ApiError`] response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message.into())))
}

/// Map a control error onto an HTTP status and envelope.
pub fn into_api_error(err: ControlError) -> ApiError {
    let status = match &err {
        ControlError::NoDeviceConnected | ControlError::NotConnected => StatusCode::CONFLICT,
        ControlError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
        ControlError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        ControlError::StoreError(StoreError::Validation(_))
        | ControlError::StoreError(StoreError::ImportFormat(_)) => StatusCode::BAD_REQUEST,
        ControlError::DispatchFailure(_) | ControlError::HttpError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

/// System status response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: String,
    pub camera_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_device: Option<DeviceInfo>,
    pub mappings: usize,
    pub custom_buttons: usize,
    pub learn_active: bool,
}

/// One row of the mapping table
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRow {
    pub control: ControlKey,
    pub function: CameraFunction,
    pub description: String,
}

/// Custom button create/update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonRequest {
    pub name: String,
    pub function: CameraFunction,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub cc: Option<u8>,
}

/// Camera connect request
#[derive(Debug, Deserialize)]
pub struct CameraConnectRequest {
    pub address: String,
}

/// Import result response
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub mappings: usize,
    pub buttons: usize,
    pub skipped: usize,
}
