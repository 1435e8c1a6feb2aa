//! # Intake Core
//!
//! Domain logic for the patient-intake relay.
//!
//! This crate contains pure state and policy:
//! - The [`PatientSnapshot`] record and its [`PatientStatus`] lifecycle
//! - The relay's single in-memory [`SnapshotStore`]
//! - The submitter's [`IntakeController`] (edits, idle demotion, validated submission)
//! - The dashboard's [`ObserverView`]
//! - Configuration resolved at startup
//!
//! **No transport concerns**: WebSocket handling, HTTP routing and the wire envelope belong in
//! `intake-relay`, `intake-cli` and `api-shared`.

pub mod config;
pub mod connection;
pub mod constants;
pub mod controller;
pub mod error;
pub mod observer;
pub mod snapshot;
pub mod store;
pub mod validation;

pub use config::{ClientConfig, CorsOrigins, RelayConfig};
pub use connection::ConnectionState;
pub use controller::{IntakeController, Push};
pub use error::{IntakeError, IntakeResult};
pub use observer::{ObserverNotice, ObserverView};
pub use snapshot::{PatientField, PatientSnapshot, PatientStatus};
pub use store::SnapshotStore;
pub use validation::{validate_email, validate_phone, validate_submission, FieldErrors};
