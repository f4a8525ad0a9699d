//! Contact validation
//!
//! Every rule is evaluated; nothing short-circuits. Invalid input is a
//! normal return value, never an error or a mutation.

use crate::config::{
    MAX_ADDRESS_LENGTH, MAX_EMAIL_LENGTH, MAX_FIRST_NAME_LENGTH, MAX_LAST_NAME_LENGTH,
    MAX_NOTES_LENGTH, MAX_PHONE_NUMBER_LENGTH, PHONE_EXTENSION_MARKERS, PHONE_SEPARATORS,
};
use crate::models::{Contact, ContactField};
use serde::Serialize;
use std::fmt;

/// What went wrong with a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViolationKind {
    Required,
    TooLong { max: usize },
    InvalidFormat,
}

/// A single field-rule violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    #[serde(serialize_with = "serialize_field")]
    pub field: ContactField,
    pub kind: ViolationKind,
}

fn serialize_field<S>(field: &ContactField, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(field.label())
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::Required => write!(f, "{} is required", self.field),
            ViolationKind::TooLong { max } => {
                write!(f, "{} must not exceed {} characters", self.field, max)
            }
            ViolationKind::InvalidFormat => write!(f, "{} has an invalid format", self.field),
        }
    }
}

/// Ordered list of violations; empty means valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Whether any violation concerns `field`
    pub fn has(&self, field: ContactField) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// Display strings, one per violation
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(Violation::to_string).collect()
    }

    fn push(&mut self, field: ContactField, kind: ViolationKind) {
        self.0.push(Violation { field, kind });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Check a candidate contact against every field rule
pub fn validate_contact(contact: &Contact) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    check_required(
        &mut errors,
        ContactField::FirstName,
        &contact.first_name,
        MAX_FIRST_NAME_LENGTH,
    );
    check_required(
        &mut errors,
        ContactField::LastName,
        &contact.last_name,
        MAX_LAST_NAME_LENGTH,
    );

    let phone = &contact.phone_number;
    if phone.trim().is_empty() {
        errors.push(ContactField::PhoneNumber, ViolationKind::Required);
    } else {
        if !is_valid_phone(phone) {
            errors.push(ContactField::PhoneNumber, ViolationKind::InvalidFormat);
        }
        check_length(&mut errors, ContactField::PhoneNumber, phone, MAX_PHONE_NUMBER_LENGTH);
    }

    if let Some(email) = present(&contact.email) {
        if !is_valid_email(email) {
            errors.push(ContactField::Email, ViolationKind::InvalidFormat);
        }
        check_length(&mut errors, ContactField::Email, email, MAX_EMAIL_LENGTH);
    }

    if let Some(address) = present(&contact.address) {
        check_length(&mut errors, ContactField::Address, address, MAX_ADDRESS_LENGTH);
    }

    if let Some(notes) = present(&contact.notes) {
        check_length(&mut errors, ContactField::Notes, notes, MAX_NOTES_LENGTH);
    }

    errors
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn check_required(errors: &mut ValidationErrors, field: ContactField, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(field, ViolationKind::Required);
    } else {
        check_length(errors, field, value, max);
    }
}

fn check_length(errors: &mut ValidationErrors, field: ContactField, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(field, ViolationKind::TooLong { max });
    }
}

/// Digits with optional leading '+', common separators and an optional
/// trailing extension ("x12", "ext. 12"). At least one digit is required.
pub fn is_valid_phone(value: &str) -> bool {
    let mut body = value.trim();
    body = body.strip_prefix('+').unwrap_or(body);
    let body = strip_extension(body);

    body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || PHONE_SEPARATORS.contains(&c))
}

fn strip_extension(value: &str) -> &str {
    let lower = value.to_ascii_lowercase();

    for marker in PHONE_EXTENSION_MARKERS {
        if let Some(pos) = lower.rfind(marker) {
            let digits = lower[pos + marker.len()..].trim_start();
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return value[..pos].trim_end();
            }
        }
    }

    value
}

/// Exactly one '@' with text on both sides and no whitespace
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_contact() -> Contact {
        let mut contact = Contact::new();
        contact.first_name = "Anna".to_string();
        contact.last_name = "Kowalska".to_string();
        contact.phone_number = "+48 600-100-200".to_string();
        contact
    }

    #[test]
    fn test_valid_contact_has_no_violations() {
        let mut contact = valid_contact();
        contact.email = Some("anna@example.com".to_string());
        contact.address = Some("Main St 1".to_string());
        contact.notes = Some("Met at the conference".to_string());

        assert!(validate_contact(&contact).is_empty());
    }

    #[test]
    fn test_missing_required_fields_are_all_reported() {
        let contact = Contact::new();
        let errors = validate_contact(&contact);

        assert_eq!(errors.len(), 3);
        assert!(errors.has(ContactField::FirstName));
        assert!(errors.has(ContactField::LastName));
        assert!(errors.has(ContactField::PhoneNumber));
        assert_eq!(errors.messages()[0], "First name is required");
    }

    #[test]
    fn test_whitespace_only_name_is_missing() {
        let mut contact = valid_contact();
        contact.last_name = "   ".to_string();

        let errors = validate_contact(&contact);
        assert_eq!(
            errors.iter().next().map(|v| v.kind),
            Some(ViolationKind::Required)
        );
    }

    #[test]
    fn test_first_name_length_limit() {
        let mut contact = valid_contact();
        contact.first_name = "a".repeat(MAX_FIRST_NAME_LENGTH);
        assert!(validate_contact(&contact).is_empty());

        contact.first_name = "a".repeat(MAX_FIRST_NAME_LENGTH + 1);
        let errors = validate_contact(&contact);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.messages()[0],
            "First name must not exceed 50 characters"
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut contact = valid_contact();
        contact.first_name = "ż".repeat(MAX_FIRST_NAME_LENGTH);
        assert!(validate_contact(&contact).is_empty());
    }

    #[test]
    fn test_phone_format_and_length_both_reported() {
        let mut contact = valid_contact();
        contact.phone_number = "call me maybe, anytime!".to_string();

        let errors = validate_contact(&contact);
        let kinds: Vec<_> = errors.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::InvalidFormat,
                ViolationKind::TooLong {
                    max: MAX_PHONE_NUMBER_LENGTH
                }
            ]
        );
    }

    #[test]
    fn test_phone_shapes() {
        assert!(is_valid_phone("600100200"));
        assert!(is_valid_phone("+1 (555) 010-9999"));
        assert!(is_valid_phone("555.0101 ext. 12"));
        assert!(is_valid_phone("555-0101x7"));
        assert!(!is_valid_phone("+"));
        assert!(!is_valid_phone("12a34"));
        assert!(!is_valid_phone("phone"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b"));
        assert!(is_valid_email("jan.kowalski@example.pl"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jan@"));
        assert!(!is_valid_email("a@b@c"));
        assert!(!is_valid_email("jan kowalski@example.com"));
    }

    #[test]
    fn test_optional_fields() {
        let mut contact = valid_contact();
        contact.email = Some("   ".to_string());
        contact.address = Some("x".repeat(MAX_ADDRESS_LENGTH + 1));
        contact.notes = Some("n".repeat(MAX_NOTES_LENGTH + 1));

        let errors = validate_contact(&contact);
        assert!(!errors.has(ContactField::Email));
        assert!(errors.has(ContactField::Address));
        assert!(errors.has(ContactField::Notes));
    }

    #[test]
    fn test_invalid_email_reported() {
        let mut contact = valid_contact();
        contact.email = Some("not-an-email".to_string());

        let errors = validate_contact(&contact);
        assert_eq!(errors.to_string(), "Email has an invalid format");
    }
}
