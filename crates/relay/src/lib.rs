//! # Intake Relay
//!
//! Real-time relay for the patient-intake form.
//!
//! Handles:
//! - The relay hub: single owner of the latest snapshot, fan-out to connections
//! - WebSocket connections (`/ws`) and the readiness endpoint (`/health`)
//! - CORS as configured at startup
//!
//! Uses `api-shared` for the wire envelope and `intake-core` for the snapshot store.

#![warn(rust_2018_idioms)]

pub mod hub;
pub mod server;

pub use hub::{spawn_hub, ConnectionId, HubHandle, RelayHub};
pub use server::{router, serve, serve_on};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to bind relay listener: {0}")]
    Bind(std::io::Error),
    #[error("relay server stopped: {0}")]
    Serve(std::io::Error),
    #[error("relay hub is not running")]
    HubUnavailable,
    #[error("intake core error: {0}")]
    Core(#[from] intake_core::IntakeError),
}
