//! Application configuration constants
//!
//! Central location for file names, field limits and validation
//! boundaries used throughout the application.

// ===== Data Files =====

/// Contacts document, relative to the data directory
pub const CONTACTS_FILE_NAME: &str = "phonebook.json";

/// Settings document, relative to the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Environment variable overriding the data directory.
/// When unset, both files live in the current working directory.
pub const DATA_DIR_ENV: &str = "PHONEBOOK_DATA_DIR";

// ===== Contact Field Limits =====

/// Maximum length of a first name, in characters
pub const MAX_FIRST_NAME_LENGTH: usize = 50;

/// Maximum length of a last name, in characters
pub const MAX_LAST_NAME_LENGTH: usize = 50;

/// Maximum length of a phone number, in characters
pub const MAX_PHONE_NUMBER_LENGTH: usize = 20;

/// Maximum length of an email address, in characters
pub const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length of a postal address, in characters
pub const MAX_ADDRESS_LENGTH: usize = 100;

/// Maximum length of free-form notes, in characters
pub const MAX_NOTES_LENGTH: usize = 500;

// ===== Phone Number Shape =====

/// Separators allowed between phone number digits, besides whitespace
pub const PHONE_SEPARATORS: &[char] = &['-', '.', '(', ')'];

/// Extension markers accepted at the end of a phone number (e.g. "x12", "ext. 12").
/// Checked longest first.
pub const PHONE_EXTENSION_MARKERS: &[&str] = &["ext.", "ext", "x"];
