//! Submission validation.
//!
//! The submitter checks required fields and the phone/email patterns before a form is marked
//! `submitted`. The relay never validates anything; this gate lives entirely on the client.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{
    INVALID_EMAIL_MESSAGE, INVALID_PHONE_MESSAGE, REQUIRED_FIELDS, REQUIRED_FIELD_MESSAGE,
};
use crate::{PatientField, PatientSnapshot};

/// Field-level validation messages keyed by field, in form order.
pub type FieldErrors = BTreeMap<PatientField, String>;

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("phone pattern is valid"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Validates a phone number.
///
/// Whitespace and hyphens are stripped first; the remainder must be an optional leading `+`
/// followed by 8 to 15 ASCII digits.
///
/// # Arguments
///
/// * `phone` - The phone number as typed.
///
/// # Returns
///
/// `true` if the number is acceptable.
pub fn validate_phone(phone: &str) -> bool {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    phone_pattern().is_match(&compact)
}

/// Validates an email address: `local@domain.tld` with no whitespace and a single `@`.
pub fn validate_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Checks a snapshot for submission.
///
/// # Errors
///
/// Returns every failing field with its message. Pattern checks only run on non-empty values,
/// so an empty phone number reports "required" rather than "invalid".
pub fn validate_submission(snapshot: &PatientSnapshot) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for field in REQUIRED_FIELDS {
        if snapshot.get(field).is_empty() {
            errors.insert(field, REQUIRED_FIELD_MESSAGE.to_string());
        }
    }

    if !snapshot.phone_number.is_empty() && !validate_phone(&snapshot.phone_number) {
        errors.insert(PatientField::PhoneNumber, INVALID_PHONE_MESSAGE.to_string());
    }
    if !snapshot.email.is_empty() && !validate_email(&snapshot.email) {
        errors.insert(PatientField::Email, INVALID_EMAIL_MESSAGE.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
pub(crate) fn valid_snapshot() -> PatientSnapshot {
    PatientSnapshot::from_initial_values(
        [
            (PatientField::FirstName, "Ana"),
            (PatientField::LastName, "Silva"),
            (PatientField::DateOfBirth, "1990-04-12"),
            (PatientField::Gender, "female"),
            (PatientField::Nationality, "Portuguese"),
            (PatientField::PreferredLanguage, "Portuguese"),
            (PatientField::PhoneNumber, "+351 912-345-678"),
            (PatientField::Email, "ana@example.pt"),
            (PatientField::Address, "Rua Augusta 1, Lisboa"),
        ],
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_phone_numbers() {
        assert!(validate_phone("+1234567890"));
        assert!(validate_phone("12345678"));
        assert!(validate_phone("+44 20-7946 0958"));
        assert!(validate_phone("123456789012345"));
    }

    #[test]
    fn rejects_invalid_phone_numbers() {
        assert!(!validate_phone("abc"));
        assert!(!validate_phone("123"));
        assert!(!validate_phone("1234567"));
        assert!(!validate_phone("1234567890123456"));
        assert!(!validate_phone("++12345678"));
        assert!(!validate_phone("1234+5678"));
        assert!(!validate_phone(""));
    }

    #[test]
    fn rejects_non_ascii_digits() {
        // Arabic-Indic and fullwidth digits are Unicode decimal digits but not phone digits.
        let arabic_indic = "\u{0661}\u{0662}\u{0663}\u{0664}\u{0665}\u{0666}\u{0667}\u{0668}";
        assert!(!validate_phone(arabic_indic));
        let fullwidth = "\u{FF11}\u{FF12}\u{FF13}\u{FF14}\u{FF15}\u{FF16}\u{FF17}\u{FF18}";
        assert!(!validate_phone(fullwidth));
        assert!(!validate_phone("+351 \u{0669}12-345-678"));
    }

    #[test]
    fn accepts_valid_emails() {
        assert!(validate_email("a@b.co"));
        assert!(validate_email("first.last@clinic.example.org"));
    }

    #[test]
    fn rejects_invalid_emails() {
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a.com"));
        assert!(!validate_email("a b@c.de"));
        assert!(!validate_email("a@@b.co"));
        assert!(!validate_email(""));
    }

    #[test]
    fn complete_form_passes() {
        assert_eq!(validate_submission(&valid_snapshot()), Ok(()));
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = validate_submission(&PatientSnapshot::default()).expect_err("invalid");
        assert_eq!(errors.len(), REQUIRED_FIELDS.len());
        for field in REQUIRED_FIELDS {
            assert_eq!(errors[&field], REQUIRED_FIELD_MESSAGE);
        }
        assert!(!errors.contains_key(&PatientField::MiddleName));
        assert!(!errors.contains_key(&PatientField::Religion));
    }

    #[test]
    fn malformed_contact_details_are_reported() {
        let mut snapshot = valid_snapshot();
        snapshot.phone_number = "123".into();
        snapshot.email = "a@b".into();

        let errors = validate_submission(&snapshot).expect_err("invalid");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&PatientField::PhoneNumber], INVALID_PHONE_MESSAGE);
        assert_eq!(errors[&PatientField::Email], INVALID_EMAIL_MESSAGE);
    }
}
