//! Constants used throughout the intake core crate.
//!
//! Defaults for configuration live here so the relay, the runner binary and the
//! CLI agree on them without re-declaring literals.

use std::time::Duration;

use crate::snapshot::PatientField;

/// Default TCP port the relay listens on when `SOCKET_PORT` is unset.
pub const DEFAULT_SOCKET_PORT: u16 = 3001;

/// Default listen host for the relay.
pub const DEFAULT_SOCKET_HOST: &str = "0.0.0.0";

/// Wildcard value for `SOCKET_CORS_ORIGIN` meaning "any origin".
pub const CORS_ANY_ORIGIN: &str = "*";

/// Path of the WebSocket endpoint served by the relay.
pub const SOCKET_PATH: &str = "/ws";

/// Default relay endpoint used by both client roles when `SOCKET_URL` is unset.
pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:3001/ws";

/// Idle duration after which a filling session is demoted to inactive.
pub const INACTIVITY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// How often the submitter checks for inactivity.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

/// Delay between reconnection attempts of a client link.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(1_000);

/// Fields that must be non-empty before a form can be submitted.
pub const REQUIRED_FIELDS: [PatientField; 9] = [
    PatientField::FirstName,
    PatientField::LastName,
    PatientField::DateOfBirth,
    PatientField::Gender,
    PatientField::Nationality,
    PatientField::PreferredLanguage,
    PatientField::PhoneNumber,
    PatientField::Email,
    PatientField::Address,
];

/// Validation message for a missing required field.
pub const REQUIRED_FIELD_MESSAGE: &str = "This field is required";

/// Validation message for a malformed phone number.
pub const INVALID_PHONE_MESSAGE: &str = "Please enter a valid phone number";

/// Validation message for a malformed email address.
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email";
