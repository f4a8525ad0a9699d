//! Error types for the phonebook
//!
//! All errors use thiserror for structured error handling.
//! None of them is fatal: every path leaves the in-memory book usable.

use crate::services::validation::ValidationErrors;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A data file exists but could not be read or parsed
    #[error("Failed to load data: {reason}\nFile: {}", .path.display())]
    PersistenceRead { path: PathBuf, reason: String },

    /// A data file could not be written
    #[error("Failed to save data: {reason}\nPath: {}", .path.display())]
    PersistenceWrite { path: PathBuf, reason: String },

    #[error("Validation errors:\n{0}")]
    Validation(ValidationErrors),

    #[error("Contact not found: {0}")]
    ContactNotFound(Uuid),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
