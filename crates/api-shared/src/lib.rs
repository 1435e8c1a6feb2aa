//! # API Shared
//!
//! Definitions shared by the relay server and its clients.
//!
//! Contains:
//! - The WebSocket wire envelope (`patient:update` / `staff:update`)
//! - The readiness `HealthService`
//!
//! Used by `intake-relay` and `intake-cli`.

pub mod health;
pub mod wire;

pub use health::{HealthRes, HealthService};
pub use wire::{ClientEvent, ServerEvent, WireError, PATIENT_UPDATE, STAFF_UPDATE};
