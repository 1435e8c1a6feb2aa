//! Patient-intake snapshot model.
//!
//! A [`PatientSnapshot`] is the complete intake form at one instant. It is always transmitted
//! whole; there are no partial or delta updates and no per-field versioning. The wire form uses
//! camelCase keys and a lowercase `status`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{IntakeError, IntakeResult};

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of an intake session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    /// The submitter is editing the form.
    Filling,
    /// The form passed validation and was submitted.
    Submitted,
    /// Nobody is interacting with the form, or the submitter went away.
    #[default]
    Inactive,
}

impl PatientStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Filling => "filling",
            PatientStatus::Submitted => "submitted",
            PatientStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filling" => Ok(PatientStatus::Filling),
            "submitted" => Ok(PatientStatus::Submitted),
            "inactive" => Ok(PatientStatus::Inactive),
            other => Err(IntakeError::UnknownStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

/// The string-valued fields of the intake form, in form order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatientField {
    FirstName,
    MiddleName,
    LastName,
    DateOfBirth,
    Gender,
    Nationality,
    Religion,
    PreferredLanguage,
    PhoneNumber,
    Email,
    Address,
    EmergencyContactName,
    EmergencyContactRelationship,
}

impl PatientField {
    /// Every field, in form order.
    pub const ALL: [PatientField; 13] = [
        PatientField::FirstName,
        PatientField::MiddleName,
        PatientField::LastName,
        PatientField::DateOfBirth,
        PatientField::Gender,
        PatientField::Nationality,
        PatientField::Religion,
        PatientField::PreferredLanguage,
        PatientField::PhoneNumber,
        PatientField::Email,
        PatientField::Address,
        PatientField::EmergencyContactName,
        PatientField::EmergencyContactRelationship,
    ];

    /// Wire name of the field (the camelCase JSON key).
    pub fn as_str(self) -> &'static str {
        match self {
            PatientField::FirstName => "firstName",
            PatientField::MiddleName => "middleName",
            PatientField::LastName => "lastName",
            PatientField::DateOfBirth => "dateOfBirth",
            PatientField::Gender => "gender",
            PatientField::Nationality => "nationality",
            PatientField::Religion => "religion",
            PatientField::PreferredLanguage => "preferredLanguage",
            PatientField::PhoneNumber => "phoneNumber",
            PatientField::Email => "email",
            PatientField::Address => "address",
            PatientField::EmergencyContactName => "emergencyContactName",
            PatientField::EmergencyContactRelationship => "emergencyContactRelationship",
        }
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientField {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| IntakeError::UnknownField(s.to_string()))
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Complete intake form state.
///
/// `Default` is the empty record with status [`PatientStatus::Inactive`], which is also what the
/// relay starts with. Missing keys deserialize to empty strings so that a partially filled
/// payload from an older client still renders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientSnapshot {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub nationality: String,
    pub religion: String,
    pub preferred_language: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub emergency_contact_name: String,
    pub emergency_contact_relationship: String,
    pub status: PatientStatus,
}

impl PatientSnapshot {
    /// Build a snapshot from partial initial values.
    ///
    /// Unspecified fields are empty. The status defaults to `inactive` unless given.
    pub fn from_initial_values<I, V>(values: I, status: Option<PatientStatus>) -> Self
    where
        I: IntoIterator<Item = (PatientField, V)>,
        V: Into<String>,
    {
        let mut snapshot = Self::default();
        for (field, value) in values {
            snapshot.set(field, value);
        }
        snapshot.status = status.unwrap_or_default();
        snapshot
    }

    /// Current value of `field`.
    pub fn get(&self, field: PatientField) -> &str {
        match field {
            PatientField::FirstName => &self.first_name,
            PatientField::MiddleName => &self.middle_name,
            PatientField::LastName => &self.last_name,
            PatientField::DateOfBirth => &self.date_of_birth,
            PatientField::Gender => &self.gender,
            PatientField::Nationality => &self.nationality,
            PatientField::Religion => &self.religion,
            PatientField::PreferredLanguage => &self.preferred_language,
            PatientField::PhoneNumber => &self.phone_number,
            PatientField::Email => &self.email,
            PatientField::Address => &self.address,
            PatientField::EmergencyContactName => &self.emergency_contact_name,
            PatientField::EmergencyContactRelationship => &self.emergency_contact_relationship,
        }
    }

    /// Overwrite `field` with `value`. The status is left untouched.
    ///
    /// # Arguments
    ///
    /// * `field` - The field to write.
    /// * `value` - The new value; an empty string clears the field.
    pub fn set(&mut self, field: PatientField, value: impl Into<String>) {
        let slot = match field {
            PatientField::FirstName => &mut self.first_name,
            PatientField::MiddleName => &mut self.middle_name,
            PatientField::LastName => &mut self.last_name,
            PatientField::DateOfBirth => &mut self.date_of_birth,
            PatientField::Gender => &mut self.gender,
            PatientField::Nationality => &mut self.nationality,
            PatientField::Religion => &mut self.religion,
            PatientField::PreferredLanguage => &mut self.preferred_language,
            PatientField::PhoneNumber => &mut self.phone_number,
            PatientField::Email => &mut self.email,
            PatientField::Address => &mut self.address,
            PatientField::EmergencyContactName => &mut self.emergency_contact_name,
            PatientField::EmergencyContactRelationship => {
                &mut self.emergency_contact_relationship
            }
        };
        *slot = value.into();
    }

    /// Copy of this snapshot with a different status and identical fields.
    pub fn with_status(&self, status: PatientStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Render the snapshot as a JSON value for the wire.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Serialization` if serialization fails.
    pub fn to_value(&self) -> IntakeResult<serde_json::Value> {
        serde_json::to_value(self).map_err(IntakeError::Serialization)
    }
}
