//! In-memory holder of the single latest intake snapshot.
//!
//! The relay stores whatever payload a submitter sends, verbatim, so the store works on raw
//! JSON values rather than [`PatientSnapshot`]. Payloads are not validated; a malformed update
//! is the sender's problem and is relayed as-is.
//!
//! Nothing here is persisted. A process restart resets the store to the empty snapshot.

use serde_json::Value;

use crate::{IntakeResult, PatientSnapshot, PatientStatus};

/// Key of the status entry inside a snapshot object.
const STATUS_KEY: &str = "status";

/// Single-writer store for the latest snapshot payload.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotStore {
    latest: Value,
}

impl SnapshotStore {
    /// Create a store holding the empty snapshot with status `inactive`.
    pub fn new() -> IntakeResult<Self> {
        Ok(Self {
            latest: PatientSnapshot::default().to_value()?,
        })
    }

    /// The payload to send to a newly connected party.
    ///
    /// Returns `None` only when a sender replaced the snapshot with JSON `null`.
    pub fn current(&self) -> Option<&Value> {
        if self.latest.is_null() {
            None
        } else {
            Some(&self.latest)
        }
    }

    /// Replace the stored payload with `payload` (last write wins).
    pub fn replace(&mut self, payload: Value) -> &Value {
        self.latest = payload;
        &self.latest
    }

    /// Force the stored payload's status to `inactive`, keeping every other key.
    ///
    /// A payload that is not a JSON object carries no fields to keep, so it is replaced by the
    /// empty snapshot with status `inactive`. This covers `null`, strings, arrays, numbers and
    /// booleans alike: no index keys are synthesized from strings or arrays, and scalars do
    /// not collapse to a lone `{"status": "inactive"}`.
    pub fn force_inactive(&mut self) -> IntakeResult<&Value> {
        match &mut self.latest {
            Value::Object(map) => {
                map.insert(
                    STATUS_KEY.to_string(),
                    Value::String(PatientStatus::Inactive.as_str().to_string()),
                );
            }
            other => {
                tracing::debug!("stored payload is not an object; resetting to empty snapshot");
                *other = PatientSnapshot::default().to_value()?;
            }
        }
        Ok(&self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_with_empty_inactive_snapshot() {
        let store = SnapshotStore::new().expect("create store");
        let current = store.current().expect("snapshot present");
        let expected = PatientSnapshot::default().to_value().expect("serialize");
        assert_eq!(current, &expected);
        assert_eq!(current["status"], "inactive");
    }

    #[test]
    fn replace_is_last_write_wins() {
        let mut store = SnapshotStore::new().expect("create store");
        store.replace(json!({ "firstName": "Ana", "status": "filling" }));
        store.replace(json!({ "firstName": "Bea", "status": "filling" }));
        assert_eq!(store.current().unwrap()["firstName"], "Bea");
    }

    #[test]
    fn stores_malformed_payloads_verbatim() {
        let mut store = SnapshotStore::new().expect("create store");
        let payload = json!({ "favouriteColour": "teal", "status": 42 });
        store.replace(payload.clone());
        assert_eq!(store.current(), Some(&payload));
    }

    #[test]
    fn force_inactive_keeps_other_fields() {
        let mut store = SnapshotStore::new().expect("create store");
        let mut snapshot = PatientSnapshot::default();
        snapshot.first_name = "Ana".into();
        snapshot.status = PatientStatus::Submitted;
        store.replace(snapshot.to_value().unwrap());

        let inactive = store.force_inactive().expect("force inactive").clone();

        let expected = snapshot.with_status(PatientStatus::Inactive).to_value().unwrap();
        assert_eq!(inactive, expected);
        assert_eq!(store.current(), Some(&expected));
    }

    #[test]
    fn force_inactive_adds_status_to_objects_without_one() {
        let mut store = SnapshotStore::new().expect("create store");
        store.replace(json!({ "firstName": "Ana" }));
        let inactive = store.force_inactive().expect("force inactive");
        assert_eq!(inactive, &json!({ "firstName": "Ana", "status": "inactive" }));
    }

    #[test]
    fn null_payload_is_hidden_from_new_connections_and_reset_on_disconnect() {
        let mut store = SnapshotStore::new().expect("create store");
        store.replace(Value::Null);
        assert!(store.current().is_none());

        let reset = store.force_inactive().expect("force inactive").clone();
        assert_eq!(reset, PatientSnapshot::default().to_value().unwrap());
        assert!(store.current().is_some());
    }

    #[test]
    fn non_object_payloads_reset_to_empty_inactive_snapshot() {
        let empty = PatientSnapshot::default().to_value().unwrap();
        for payload in [json!("x"), json!([1]), json!(42), json!(false)] {
            let mut store = SnapshotStore::new().expect("create store");
            store.replace(payload.clone());
            assert_eq!(store.current(), Some(&payload));

            let reset = store.force_inactive().expect("force inactive").clone();
            assert_eq!(reset, empty, "payload {payload}");
            assert_eq!(store.current(), Some(&empty));
        }
    }
}
