//! REST API route definitions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use camdeck_core::{
    CameraFunction, CustomButton, CustomButtonExport, DeviceInfo, MappingExport, PanelSettings,
};

use super::handlers::{
    into_api_error, ApiError, ApiResponse, ButtonRequest, CameraConnectRequest, ImportResponse,
    MappingRow, StatusResponse,
};
use super::server::AppState;
use crate::manager::ButtonDraft;

/// Build the API router
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/devices", get(get_devices))
        .route("/api/devices/:id/connect", post(connect_device))
        .route("/api/devices/disconnect", post(disconnect_device))
        .route("/api/camera/connect", post(connect_camera))
        .route("/api/camera/disconnect", post(disconnect_camera))
        .route("/api/mappings", get(get_mappings).delete(clear_all_mappings))
        .route("/api/mappings/:function", delete(clear_mapping))
        .route("/api/learn/:function", post(start_learn))
        .route("/api/learn", delete(cancel_learn))
        .route("/api/buttons", get(get_buttons).post(create_button))
        .route("/api/buttons/learn", post(learn_new_button))
        .route("/api/buttons/:id", put(update_button).delete(delete_button))
        .route("/api/buttons/:id/learn", post(learn_button))
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/export/mappings", get(export_mappings))
        .route("/api/export/buttons", get(export_buttons))
        .route("/api/import", post(import_document))
}

/// GET /api/status - Runtime status summary
async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<StatusResponse>> {
    let manager = &state.manager;
    let status = StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        camera_connected: manager.camera_connected(),
        midi_device: manager.connected_device().await,
        mappings: manager.mapping_entries().await.len(),
        custom_buttons: manager.custom_buttons().await.len(),
        learn_active: manager.learn_active().await,
    };
    Json(ApiResponse::success(status))
}

/// GET /api/devices - Enumerate MIDI input ports
async fn get_devices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeviceInfo>>>, ApiError> {
    let devices = state.manager.list_devices().await.map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(devices)))
}

/// POST /api/devices/:id/connect - Open a MIDI input port
async fn connect_device(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DeviceInfo>>, ApiError> {
    let device = state
        .manager
        .connect_device(&id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(device)))
}

/// POST /api/devices/disconnect - Close the open MIDI input
async fn disconnect_device(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.manager.disconnect_device().await;
    Json(ApiResponse::success(()))
}

/// POST /api/camera/connect - Probe and connect the camera
async fn connect_camera(
    State(state): State<AppState>,
    Json(request): Json<CameraConnectRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .manager
        .connect_camera(&request.address)
        .await
        .map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(())))
}

/// POST /api/camera/disconnect - Drop the camera session
async fn disconnect_camera(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.manager.disconnect_camera().await;
    Json(ApiResponse::success(()))
}

/// GET /api/mappings - The mapping table
async fn get_mappings(State(state): State<AppState>) -> Json<ApiResponse<Vec<MappingRow>>> {
    let rows = state
        .manager
        .mapping_entries()
        .await
        .into_iter()
        .map(|entry| MappingRow {
            control: entry.key,
            function: entry.function,
            description: entry.function.description().to_string(),
        })
        .collect();
    Json(ApiResponse::success(rows))
}

/// DELETE /api/mappings/:function - Unbind one function
async fn clear_mapping(
    Path(function): Path<CameraFunction>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if state.manager.clear_mapping(function).await {
        Ok(Json(ApiResponse::success(())))
    } else {
        Err(super::handlers::api_error(
            StatusCode::NOT_FOUND,
            format!("No mapping for {}", function),
        ))
    }
}

/// DELETE /api/mappings - Clear the whole mapping table
async fn clear_all_mappings(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.manager.clear_all_mappings().await;
    Json(ApiResponse::success(()))
}

/// POST /api/learn/:function - Start a simple learn session
async fn start_learn(
    Path(function): Path<CameraFunction>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .manager
        .start_function_learn(function)
        .await
        .map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(())))
}

/// DELETE /api/learn - Cancel the pending learn session
async fn cancel_learn(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.manager.cancel_learn().await;
    Json(ApiResponse::success(()))
}

/// GET /api/buttons - The custom button set
async fn get_buttons(State(state): State<AppState>) -> Json<ApiResponse<Vec<CustomButton>>> {
    Json(ApiResponse::success(state.manager.custom_buttons().await))
}

/// POST /api/buttons - Create a custom button
async fn create_button(
    State(state): State<AppState>,
    Json(request): Json<ButtonRequest>,
) -> Result<Json<ApiResponse<CustomButton>>, ApiError> {
    let draft = ButtonDraft {
        id: None,
        name: request.name,
        function: request.function,
        value: request.value,
        cc: request.cc,
    };
    let button = state.manager.save_button(draft).await.map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(button)))
}

/// PUT /api/buttons/:id - Update a custom button
async fn update_button(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<ButtonRequest>,
) -> Result<Json<ApiResponse<CustomButton>>, ApiError> {
    let draft = ButtonDraft {
        id: Some(id),
        name: request.name,
        function: request.function,
        value: request.value,
        cc: request.cc,
    };
    let button = state.manager.save_button(draft).await.map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(button)))
}

/// DELETE /api/buttons/:id - Delete a custom button
async fn delete_button(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Json<ApiResponse<()>> {
    state.manager.delete_button(&id).await;
    Json(ApiResponse::success(()))
}

/// POST /api/buttons/learn - Capture a controller for a new button edit
async fn learn_new_button(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .manager
        .start_button_learn(None)
        .await
        .map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(())))
}

/// POST /api/buttons/:id/learn - Capture a controller for an existing button
async fn learn_button(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .manager
        .start_button_learn(Some(id))
        .await
        .map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(())))
}

/// GET /api/settings - Current panel settings
async fn get_settings(State(state): State<AppState>) -> Json<ApiResponse<PanelSettings>> {
    Json(ApiResponse::success(state.manager.settings().await))
}

/// PUT /api/settings - Replace the panel settings
async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<PanelSettings>,
) -> Json<ApiResponse<PanelSettings>> {
    state.manager.update_settings(settings.clone()).await;
    Json(ApiResponse::success(settings))
}

/// GET /api/export/mappings - Versioned mapping export document
async fn export_mappings(State(state): State<AppState>) -> Json<ApiResponse<MappingExport>> {
    Json(ApiResponse::success(state.manager.export_mappings().await))
}

/// GET /api/export/buttons - Versioned custom button export document
async fn export_buttons(State(state): State<AppState>) -> Json<ApiResponse<CustomButtonExport>> {
    Json(ApiResponse::success(state.manager.export_buttons().await))
}

/// POST /api/import - Import an export document
async fn import_document(
    State(state): State<AppState>,
    Json(document): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<ImportResponse>>, ApiError> {
    let summary = state.manager.import(&document).await.map_err(into_api_error)?;
    Ok(Json(ApiResponse::success(ImportResponse {
        mappings: summary.mappings,
        buttons: summary.buttons,
        skipped: summary.skipped,
    })))
}
