//! Submission-side controller.
//!
//! Owns the submitter's working copy of the form and decides when a snapshot must be pushed to
//! the relay. The controller does no I/O: every operation that should reach the relay returns
//! the snapshot to send, and returns `None` when the link is down. Edits made while offline are
//! kept locally and reach the relay only through the full resend on the next connect.
//!
//! Time is passed in explicitly so the idle policy can be driven by a test clock.

use std::time::{Duration, Instant};

use crate::validation::{validate_submission, FieldErrors};
use crate::{ConnectionState, PatientField, PatientSnapshot, PatientStatus};

/// A snapshot that should be sent to the relay, or `None` when nothing is to be sent.
pub type Push = Option<PatientSnapshot>;

#[derive(Clone, Debug)]
pub struct IntakeController {
    snapshot: PatientSnapshot,
    errors: FieldErrors,
    connection: ConnectionState,
    last_interaction: Instant,
    idle_timeout: Duration,
}

impl IntakeController {
    /// Creates a controller around `initial`, treating `now` as the last interaction.
    pub fn new(initial: PatientSnapshot, idle_timeout: Duration, now: Instant) -> Self {
        Self {
            snapshot: initial,
            errors: FieldErrors::new(),
            connection: ConnectionState::Connecting,
            last_interaction: now,
            idle_timeout,
        }
    }

    pub fn snapshot(&self) -> &PatientSnapshot {
        &self.snapshot
    }

    /// Validation messages from the last failed submission, minus fields edited since.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Live
    }

    /// The link to the relay came up: resend the full local snapshot.
    pub fn on_connected(&mut self) -> Push {
        self.connection = ConnectionState::Live;
        tracing::debug!(status = %self.snapshot.status, "link live; resending snapshot");
        self.push()
    }

    pub fn on_disconnected(&mut self) {
        self.connection = ConnectionState::Offline;
    }

    /// Applies a field edit.
    ///
    /// The status becomes `filling` even when the form was already submitted.
    pub fn edit(&mut self, field: PatientField, value: impl Into<String>, now: Instant) -> Push {
        self.snapshot.set(field, value);
        self.snapshot.status = PatientStatus::Filling;
        self.last_interaction = now;
        self.errors.remove(&field);
        self.push()
    }

    /// Idle monitor tick.
    ///
    /// Demotes a `filling` session to `inactive` once more than the idle timeout has passed since
    /// the last edit. Submitted and already inactive sessions are left alone, so a single idle
    /// period yields at most one push.
    pub fn tick(&mut self, now: Instant) -> Push {
        let idle = now.saturating_duration_since(self.last_interaction);
        if idle <= self.idle_timeout
            || matches!(
                self.snapshot.status,
                PatientStatus::Submitted | PatientStatus::Inactive
            )
        {
            return None;
        }

        tracing::info!(idle_ms = idle.as_millis() as u64, "session idle; marking inactive");
        self.snapshot.status = PatientStatus::Inactive;
        self.push()
    }

    /// Validates and submits the form.
    ///
    /// # Errors
    ///
    /// Returns the field-level messages when validation fails. Nothing is pushed in that case and
    /// the messages are also kept in [`IntakeController::errors`].
    pub fn submit(&mut self) -> Result<Push, FieldErrors> {
        if let Err(errors) = validate_submission(&self.snapshot) {
            tracing::debug!(failures = errors.len(), "submission rejected");
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors.clear();
        self.snapshot.status = PatientStatus::Submitted;
        Ok(self.push())
    }

    fn push(&self) -> Push {
        self.is_connected().then(|| self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{INACTIVITY_TIMEOUT, REQUIRED_FIELD_MESSAGE};
    use crate::validation::valid_snapshot;

    fn controller(now: Instant) -> IntakeController {
        IntakeController::new(PatientSnapshot::default(), INACTIVITY_TIMEOUT, now)
    }

    fn live_controller(now: Instant) -> IntakeController {
        let mut c = controller(now);
        c.on_connected();
        c
    }

    #[test]
    fn starts_connecting_and_inactive() {
        let c = controller(Instant::now());
        assert_eq!(c.connection(), ConnectionState::Connecting);
        assert_eq!(c.snapshot().status, PatientStatus::Inactive);
        assert!(c.errors().is_empty());
    }

    #[test]
    fn first_edit_moves_to_filling_and_pushes_full_snapshot() {
        let now = Instant::now();
        let mut c = live_controller(now);

        let pushed = c
            .edit(PatientField::FirstName, "Ana", now)
            .expect("pushed while live");

        let mut expected = PatientSnapshot::default();
        expected.first_name = "Ana".into();
        expected.status = PatientStatus::Filling;
        assert_eq!(pushed, expected);
        assert_eq!(c.snapshot(), &expected);
    }

    #[test]
    fn offline_edits_are_kept_and_resent_on_connect() {
        let now = Instant::now();
        let mut c = controller(now);

        assert_eq!(c.edit(PatientField::FirstName, "Ana", now), None);
        assert_eq!(c.edit(PatientField::LastName, "Silva", now), None);

        let resent = c.on_connected().expect("connect resends");
        assert_eq!(resent.first_name, "Ana");
        assert_eq!(resent.last_name, "Silva");
        assert_eq!(resent.status, PatientStatus::Filling);
    }

    #[test]
    fn disconnect_stops_pushes() {
        let now = Instant::now();
        let mut c = live_controller(now);
        c.on_disconnected();

        assert_eq!(c.connection(), ConnectionState::Offline);
        assert_eq!(c.edit(PatientField::Email, "a@b.co", now), None);
        assert_eq!(c.snapshot().email, "a@b.co");
    }

    #[test]
    fn idle_filling_session_demotes_once() {
        let start = Instant::now();
        let mut c = live_controller(start);
        c.edit(PatientField::FirstName, "Ana", start);

        let later = start + INACTIVITY_TIMEOUT + Duration::from_millis(1);
        let pushed = c.tick(later).expect("one push");
        assert_eq!(pushed.status, PatientStatus::Inactive);
        assert_eq!(pushed.first_name, "Ana");

        assert_eq!(c.tick(later + Duration::from_secs(2)), None);
        assert_eq!(c.tick(later + Duration::from_secs(60)), None);
    }

    #[test]
    fn idle_threshold_is_exclusive() {
        let start = Instant::now();
        let mut c = live_controller(start);
        c.edit(PatientField::FirstName, "Ana", start);

        assert_eq!(c.tick(start + INACTIVITY_TIMEOUT), None);
        assert_eq!(c.snapshot().status, PatientStatus::Filling);
    }

    #[test]
    fn edits_reset_the_idle_clock() {
        let start = Instant::now();
        let mut c = live_controller(start);
        c.edit(PatientField::FirstName, "Ana", start);

        let mid = start + Duration::from_secs(4);
        c.edit(PatientField::LastName, "Silva", mid);

        assert_eq!(c.tick(start + Duration::from_secs(6)), None);
        assert!(c.tick(mid + INACTIVITY_TIMEOUT + Duration::from_millis(1)).is_some());
    }

    #[test]
    fn submitted_session_never_goes_idle() {
        let start = Instant::now();
        let mut c = IntakeController::new(valid_snapshot(), INACTIVITY_TIMEOUT, start);
        c.on_connected();
        c.edit(PatientField::Religion, "none", start);

        let pushed = c.submit().expect("valid form").expect("pushed while live");
        assert_eq!(pushed.status, PatientStatus::Submitted);

        assert_eq!(c.tick(start + Duration::from_secs(3600)), None);
        assert_eq!(c.snapshot().status, PatientStatus::Submitted);
    }

    #[test]
    fn idle_demotion_happens_offline_without_push() {
        let start = Instant::now();
        let mut c = controller(start);
        c.edit(PatientField::FirstName, "Ana", start);

        let later = start + INACTIVITY_TIMEOUT + Duration::from_secs(1);
        assert_eq!(c.tick(later), None);
        assert_eq!(c.snapshot().status, PatientStatus::Inactive);

        let resent = c.on_connected().expect("connect resends");
        assert_eq!(resent.status, PatientStatus::Inactive);
    }

    #[test]
    fn failed_submission_records_errors_and_pushes_nothing() {
        let now = Instant::now();
        let mut c = live_controller(now);
        c.edit(PatientField::FirstName, "Ana", now);

        let errors = c.submit().expect_err("incomplete form");
        assert!(!errors.contains_key(&PatientField::FirstName));
        assert_eq!(errors[&PatientField::LastName], REQUIRED_FIELD_MESSAGE);
        assert_eq!(c.errors(), &errors);
        assert_eq!(c.snapshot().status, PatientStatus::Filling);
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let now = Instant::now();
        let mut c = live_controller(now);
        c.submit().expect_err("empty form");
        assert!(c.errors().contains_key(&PatientField::LastName));

        c.edit(PatientField::LastName, "Silva", now);
        assert!(!c.errors().contains_key(&PatientField::LastName));
        assert!(c.errors().contains_key(&PatientField::Email));
    }

    #[test]
    fn editing_after_submission_reverts_to_filling() {
        let now = Instant::now();
        let mut c = IntakeController::new(valid_snapshot(), INACTIVITY_TIMEOUT, now);
        c.on_connected();
        c.submit().expect("valid form");

        let pushed = c
            .edit(PatientField::Address, "Rua Nova 2", now)
            .expect("pushed while live");
        assert_eq!(pushed.status, PatientStatus::Filling);
    }

    #[test]
    fn offline_submission_succeeds_without_push() {
        let now = Instant::now();
        let mut c = IntakeController::new(valid_snapshot(), INACTIVITY_TIMEOUT, now);
        assert_eq!(c.submit().expect("valid form"), None);
        assert_eq!(c.snapshot().status, PatientStatus::Submitted);
    }
}
