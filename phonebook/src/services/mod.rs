//! Services module
//!
//! Business logic services that coordinate between commands and storage.

pub mod contacts;
pub mod search;
pub mod settings;
pub mod validation;

pub use contacts::{BookEvent, ContactBook, EditMode};
pub use search::SearchQuery;
pub use settings::SettingsService;
pub use validation::{validate_contact, ValidationErrors, Violation, ViolationKind};
