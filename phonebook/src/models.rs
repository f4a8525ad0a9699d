//! Data models
//!
//! Rust structs representing the persisted entities.
//! All models use serde for serialization to the JSON data files.
//!
//! Files on disk are written with camelCase keys. The JSON store folds
//! every key to lowercase before deserializing, so each multi-word field
//! also carries its lowercase spelling as an alias.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A single person's stored details plus bookkeeping metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    #[serde(alias = "firstname", default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(alias = "lastname", default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(alias = "phonenumber", default, deserialize_with = "null_as_empty")]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(alias = "createddate", default = "Utc::now", with = "timestamp")]
    pub created_date: DateTime<Utc>,
    #[serde(alias = "modifieddate", default = "Utc::now", with = "timestamp")]
    pub modified_date: DateTime<Utc>,
}

impl Contact {
    /// Blank contact with a freshly minted identifier and both timestamps set to now
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            email: None,
            address: None,
            notes: None,
            created_date: now,
            modified_date: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replace the identifier. Only used to repair duplicate ids found on load.
    pub(crate) fn remint_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Current value of a field; absent optional fields yield `None`
    pub fn field(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::FirstName => Some(&self.first_name),
            ContactField::LastName => Some(&self.last_name),
            ContactField::PhoneNumber => Some(&self.phone_number),
            ContactField::Email => self.email.as_deref(),
            ContactField::Address => self.address.as_deref(),
            ContactField::Notes => self.notes.as_deref(),
        }
    }

    /// Overwrite a field. An empty value clears optional fields.
    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        let optional = |v: String| if v.is_empty() { None } else { Some(v) };
        match field {
            ContactField::FirstName => self.first_name = value,
            ContactField::LastName => self.last_name = value,
            ContactField::PhoneNumber => self.phone_number = value,
            ContactField::Email => self.email = optional(value),
            ContactField::Address => self.address = optional(value),
            ContactField::Notes => self.notes = optional(value),
        }
    }

    /// Turn whitespace-only optional fields into absent ones
    pub(crate) fn clear_blank_optionals(&mut self) {
        for slot in [&mut self.email, &mut self.address, &mut self.notes] {
            if slot.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *slot = None;
            }
        }
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.first_name, self.last_name, self.phone_number
        )
    }
}

/// Editable fields of a contact, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    PhoneNumber,
    Email,
    Address,
    Notes,
}

impl ContactField {
    pub const ALL: [ContactField; 6] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::PhoneNumber,
        ContactField::Email,
        ContactField::Address,
        ContactField::Notes,
    ];

    /// Human-readable label used in messages
    pub fn label(self) -> &'static str {
        match self {
            ContactField::FirstName => "First name",
            ContactField::LastName => "Last name",
            ContactField::PhoneNumber => "Phone number",
            ContactField::Email => "Email",
            ContactField::Address => "Address",
            ContactField::Notes => "Notes",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContactField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Accept "firstName", "first_name", "first-name", "first"
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "firstname" | "first" => Ok(ContactField::FirstName),
            "lastname" | "last" => Ok(ContactField::LastName),
            "phonenumber" | "phone" => Ok(ContactField::PhoneNumber),
            "email" => Ok(ContactField::Email),
            "address" => Ok(ContactField::Address),
            "notes" => Ok(ContactField::Notes),
            _ => Err(format!("Unknown field '{}'", s.trim())),
        }
    }
}

/// Color theme selection. Only the name is modelled here; palettes belong to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Hacker,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Default, Theme::Dark, Theme::Hacker];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Dark => "Dark",
            Theme::Hacker => "Hacker",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        // Older files stored the theme as its ordinal
        if let Ok(index) = s.parse::<usize>() {
            return Theme::ALL
                .get(index)
                .copied()
                .ok_or_else(|| format!("Theme index out of range: {}", index));
        }

        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown theme '{}'", s))
    }
}

impl Serialize for Theme {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Index(u64),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Name(name) => name,
            Raw::Index(index) => index.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub theme: Theme,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 on write; on read also accepts a date-time without offset, taken as UTC
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("Invalid timestamp '{}': {}", raw, e))
    }
}
