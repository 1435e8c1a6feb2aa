//! Observer (dashboard) view of the relayed snapshot.

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::{ConnectionState, IntakeError, IntakeResult, PatientSnapshot, PatientStatus};

/// What a received update means for the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverNotice {
    /// The snapshot changed.
    Updated,
    /// The snapshot just became `submitted`.
    Submitted,
}

/// Dashboard state built from `staff:update` broadcasts.
#[derive(Clone, Debug, Default)]
pub struct ObserverView {
    snapshot: PatientSnapshot,
    connection: ConnectionState,
    last_update: Option<DateTime<Local>>,
}

impl ObserverView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &PatientSnapshot {
        &self.snapshot
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    /// Human-readable time of the last update.
    pub fn last_update_text(&self) -> String {
        match self.last_update {
            Some(at) => at.format("%H:%M:%S").to_string(),
            None => "No updates yet".to_string(),
        }
    }

    pub fn on_connected(&mut self) {
        self.connection = ConnectionState::Live;
    }

    pub fn on_disconnected(&mut self) {
        self.connection = ConnectionState::Offline;
    }

    /// Applies a broadcast payload received at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidInput`] when the payload is not a snapshot. The relay
    /// forwards payloads unchecked, so the view keeps its previous state in that case.
    pub fn apply_update(
        &mut self,
        payload: Value,
        at: DateTime<Local>,
    ) -> IntakeResult<ObserverNotice> {
        let incoming: PatientSnapshot = serde_json::from_value(payload).map_err(|e| {
            IntakeError::InvalidInput(format!("malformed snapshot payload: {e}"))
        })?;

        let was_submitted = self.snapshot.status == PatientStatus::Submitted;
        self.snapshot = incoming;
        self.last_update = Some(at);

        if self.snapshot.status == PatientStatus::Submitted && !was_submitted {
            Ok(ObserverNotice::Submitted)
        } else {
            Ok(ObserverNotice::Updated)
        }
    }
}
