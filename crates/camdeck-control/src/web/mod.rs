//! Web API for the browser control panel

pub mod handlers;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::{WebServer, WebServerConfig};
