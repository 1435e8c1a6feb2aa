//! Wire protocol between the relay and its clients.
//!
//! Every WebSocket text frame carries one JSON envelope:
//!
//! ```text
//! { "event": "patient:update", "data": { ...snapshot... } }
//! ```
//!
//! The payload is kept as a raw JSON value. The relay forwards it without looking inside, and
//! clients decode it into their own snapshot type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event sent by a submitter with its full snapshot.
pub const PATIENT_UPDATE: &str = "patient:update";

/// Event sent by the relay to observers with the current snapshot.
pub const STAFF_UPDATE: &str = "staff:update";

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("failed to decode frame: {0}")]
    Decode(serde_json::Error),
    #[error("failed to encode frame: {0}")]
    Encode(serde_json::Error),
}

/// Events flowing from clients to the relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "patient:update")]
    PatientUpdate(Value),
}

/// Events flowing from the relay to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "staff:update")]
    StaffUpdate(Value),
}

impl ClientEvent {
    /// Wraps any serialisable snapshot in a `patient:update` event.
    pub fn patient_update<T: Serialize>(snapshot: &T) -> Result<Self, WireError> {
        serde_json::to_value(snapshot)
            .map(ClientEvent::PatientUpdate)
            .map_err(WireError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, WireError> {
        serde_json::from_str(text).map_err(WireError::Decode)
    }

    pub fn encode(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Encode)
    }
}

impl ServerEvent {
    pub fn decode(text: &str) -> Result<Self, WireError> {
        serde_json::from_str(text).map_err(WireError::Decode)
    }

    pub fn encode(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Encode)
    }

    pub fn into_payload(self) -> Value {
        match self {
            ServerEvent::StaffUpdate(payload) => payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn staff_update_uses_event_and_data_keys() {
        let event = ServerEvent::StaffUpdate(json!({ "firstName": "Ana" }));
        let text = event.encode().expect("encode");
        let value: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(
            value,
            json!({ "event": STAFF_UPDATE, "data": { "firstName": "Ana" } })
        );
    }

    #[test]
    fn decodes_patient_update_with_arbitrary_payload() {
        let text = r#"{"event":"patient:update","data":{"anything":[1,2,3]}}"#;
        let event = ClientEvent::decode(text).expect("decode");
        assert_eq!(event, ClientEvent::PatientUpdate(json!({ "anything": [1, 2, 3] })));
    }

    #[test]
    fn decodes_null_payload() {
        let text = r#"{"event":"patient:update","data":null}"#;
        let event = ClientEvent::decode(text).expect("decode");
        assert_eq!(event, ClientEvent::PatientUpdate(Value::Null));
    }

    #[test]
    fn rejects_unknown_events_and_non_json() {
        assert!(matches!(
            ClientEvent::decode(r#"{"event":"patient:delete","data":{}}"#),
            Err(WireError::Decode(_))
        ));
        assert!(ClientEvent::decode("hello").is_err());
        assert!(ServerEvent::decode(r#"{"event":"patient:update","data":{}}"#).is_err());
    }

    #[test]
    fn patient_update_wraps_serialisable_values() {
        #[derive(Serialize)]
        struct Form {
            status: &'static str,
        }

        let event = ClientEvent::patient_update(&Form { status: "filling" }).expect("wrap");
        assert_eq!(event, ClientEvent::PatientUpdate(json!({ "status": "filling" })));
    }
}
