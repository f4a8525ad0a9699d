//! Contact search
//!
//! Case-insensitive substring match over the searchable fields.
//! Notes are deliberately not searched.

use crate::models::{Contact, ContactField};

/// Fields a query is matched against, in order
pub const SEARCHABLE_FIELDS: [ContactField; 5] = [
    ContactField::FirstName,
    ContactField::LastName,
    ContactField::PhoneNumber,
    ContactField::Email,
    ContactField::Address,
];

/// A prepared, case-folded query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    folded: Option<String>,
}

impl SearchQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let folded = if raw.trim().is_empty() {
            None
        } else {
            Some(raw.to_lowercase())
        };
        Self { raw, folded }
    }

    /// Text as typed by the user
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Empty or whitespace-only queries match everything
    pub fn is_empty(&self) -> bool {
        self.folded.is_none()
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        let Some(needle) = &self.folded else {
            return true;
        };

        SEARCHABLE_FIELDS.iter().any(|&field| {
            contact
                .field(field)
                .is_some_and(|value| value.to_lowercase().contains(needle.as_str()))
        })
    }
}

/// One-shot form of [`SearchQuery::matches`]
pub fn matches(query: &str, contact: &Contact) -> bool {
    SearchQuery::new(query).matches(contact)
}
