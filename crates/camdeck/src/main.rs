//! camdeck - MIDI control daemon for networked cameras
//!
//! Loads the mapping store, opens the camera client and the optional MIDI
//! device, then serves the browser control panel API until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use camdeck_control::{CameraClient, ControlManager, WebServer, WebServerConfig};
use camdeck_core::MappingStore;

#[derive(Parser, Debug)]
#[command(name = "camdeck", version, about = "MIDI control daemon for networked cameras")]
struct Args {
    /// Address to bind the web API to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the web API
    #[arg(long, default_value_t = 8420)]
    port: u16,

    /// Camera address to connect to at startup (e.g. 10.0.0.5)
    #[arg(long)]
    camera: Option<String>,

    /// Connect the first MIDI device whose name contains this string
    #[arg(long)]
    midi_device: Option<String>,

    /// Path of the state file holding mappings and custom buttons
    #[arg(long, default_value = "camdeck-state.json")]
    state: PathBuf,

    /// Disable permissive CORS on the web API
    #[arg(long)]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,camdeck=debug".into()),
        )
        .init();

    let args = Args::parse();

    let store = MappingStore::load(args.state.clone())
        .with_context(|| format!("failed to load state file {}", args.state.display()))?;
    info!(
        path = %args.state.display(),
        mappings = store.mapping_count(),
        "mapping store loaded"
    );

    let camera = Arc::new(CameraClient::new().map_err(|e| anyhow::anyhow!("{e}"))?);
    let manager = ControlManager::new(store, camera);
    manager.start().await;

    if let Some(address) = &args.camera {
        match manager.connect_camera(address).await {
            Ok(()) => info!(address, "camera connected"),
            Err(err) => warn!(address, error = %err, "camera connection failed, continuing without"),
        }
    }

    if let Some(needle) = &args.midi_device {
        connect_matching_device(&manager, needle).await;
    }

    let config = WebServerConfig::new(args.port)
        .with_host(args.host)
        .with_cors(!args.no_cors);
    info!(port = config.port, "starting web API");

    WebServer::new(config, manager)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

async fn connect_matching_device(manager: &Arc<ControlManager>, needle: &str) {
    let devices = match manager.list_devices().await {
        Ok(devices) => devices,
        Err(err) => {
            warn!(error = %err, "MIDI enumeration failed");
            return;
        }
    };

    let wanted = needle.to_lowercase();
    let Some(device) = devices
        .iter()
        .find(|d| d.name.to_lowercase().contains(&wanted))
    else {
        warn!(needle, "no MIDI device matched");
        return;
    };

    match manager.connect_device(&device.id).await {
        Ok(device) => info!(device = %device.name, "MIDI device connected"),
        Err(err) => warn!(device = %device.name, error = %err, "MIDI connect failed"),
    }
}
