//! REST client for the camera control API
//!
//! Talks to the camera's HTTP control endpoint under `/control/api/v1`.
//! Connecting probes `GET /system` with a short timeout; after that, every
//! command is a single PUT, with relative adjustments doing a read before
//! the write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{CameraCommand, CameraTransport};
use crate::error::{ControlError, Result};
use async_trait::async_trait;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP camera transport.
pub struct CameraClient {
    http: reqwest::Client,
    base_url: RwLock<Option<String>>,
    connected: AtomicBool,
}

impl CameraClient {
    /// Build a client. No session is opened until [`connect`](Self::connect).
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: RwLock::new(None),
            connected: AtomicBool::new(false),
        })
    }

    async fn base(&self) -> Result<String> {
        self.base_url
            .read()
            .await
            .clone()
            .ok_or(ControlError::NotConnected)
    }

    async fn put(&self, path: &str, body: Value) -> Result<()> {
        let url = format!("{}{}", self.base().await?, path);
        let resp = self.http.put(&url).json(&body).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ControlError::DispatchFailure(format!(
                "HTTP {} on {}",
                status, path
            )))
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base().await?, path);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ControlError::DispatchFailure(format!(
                "HTTP {} on {}",
                status, path
            )));
        }
        Ok(resp.json().await?)
    }

    async fn read_i64(&self, path: &str, field: &str) -> Result<i64> {
        let value = self.get_json(path).await?;
        value[field].as_i64().ok_or_else(|| {
            ControlError::DispatchFailure(format!("missing {} in {} response", field, path))
        })
    }

    async fn read_f64(&self, path: &str, field: &str) -> Result<f64> {
        let value = self.get_json(path).await?;
        value[field].as_f64().ok_or_else(|| {
            ControlError::DispatchFailure(format!("missing {} in {} response", field, path))
        })
    }
}

fn base_url_for(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.contains("://") {
        format!("{}/control/api/v1", address)
    } else {
        format!("http://{}/control/api/v1", address)
    }
}

#[async_trait]
impl CameraTransport for CameraClient {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn connect(&self, address: &str) -> Result<()> {
        let base = base_url_for(address);
        let resp = self.http.get(format!("{}/system", base)).send().await?;
        if !resp.status().is_success() {
            return Err(ControlError::DispatchFailure(format!(
                "camera probe failed: HTTP {}",
                resp.status()
            )));
        }
        *self.base_url.write().await = Some(base);
        self.connected.store(true, Ordering::Relaxed);
        tracing::info!(address, "camera connected");
        Ok(())
    }

    async fn disconnect(&self) {
        *self.base_url.write().await = None;
        self.connected.store(false, Ordering::Relaxed);
        tracing::info!("camera disconnected");
    }

    async fn execute(&self, command: CameraCommand) -> Result<()> {
        match command {
            CameraCommand::SetIso(iso) => self.put("/video/iso", json!({ "iso": iso })).await,
            CameraCommand::SetGainDb(gain) => {
                self.put("/video/gain", json!({ "gain": gain })).await
            }
            CameraCommand::SetShutter(speed) => {
                self.put("/video/shutter", json!({ "shutterSpeed": speed }))
                    .await
            }
            CameraCommand::SetWhiteBalance(kelvin) => {
                self.put("/video/whiteBalance", json!({ "whiteBalance": kelvin }))
                    .await
            }
            CameraCommand::SetTint(tint) => {
                self.put("/video/whiteBalanceTint", json!({ "whiteBalanceTint": tint }))
                    .await
            }
            CameraCommand::SetFocus(normalised) => {
                self.put("/lens/focus", json!({ "normalised": normalised }))
                    .await
            }
            CameraCommand::SetIris(stop) => {
                self.put("/lens/iris", json!({ "apertureStop": stop })).await
            }
            CameraCommand::TriggerAutofocus => self.put("/lens/focus/doAutoFocus", json!({})).await,
            CameraCommand::SetRecording(recording) => {
                self.put("/transports/0/record", json!({ "recording": recording }))
                    .await
            }
            CameraCommand::ToggleRecording => {
                let value = self.get_json("/transports/0/record").await?;
                let recording = value["recording"].as_bool().unwrap_or(false);
                self.put("/transports/0/record", json!({ "recording": !recording }))
                    .await
            }
            CameraCommand::AdjustGainDb(delta) => {
                let current = self.read_i64("/video/gain", "gain").await.unwrap_or(0);
                let gain = (current + i64::from(delta)).clamp(0, 26);
                self.put("/video/gain", json!({ "gain": gain })).await
            }
            CameraCommand::AdjustShutter(delta) => {
                let current = self
                    .read_i64("/video/shutter", "shutterSpeed")
                    .await
                    .unwrap_or(50);
                let speed = (current + i64::from(delta)).clamp(50, 2000);
                self.put("/video/shutter", json!({ "shutterSpeed": speed }))
                    .await
            }
            CameraCommand::AdjustFocus(delta) => {
                let current = self.read_f64("/lens/focus", "normalised").await.unwrap_or(0.5);
                let focus = (current + delta).clamp(0.0, 1.0);
                self.put("/lens/focus", json!({ "normalised": focus })).await
            }
            CameraCommand::AdjustZoom(delta) => {
                let current = self.read_f64("/lens/zoom", "normalised").await.unwrap_or(0.0);
                let zoom = (current + delta).clamp(0.0, 1.0);
                self.put("/lens/zoom", json!({ "normalised": zoom })).await
            }
        }
    }
}
