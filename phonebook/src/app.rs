//! Application state and initialization
//!
//! Resolves the data directory and opens the contact book with the
//! settings loaded from it.

use crate::config::{CONTACTS_FILE_NAME, DATA_DIR_ENV, SETTINGS_FILE_NAME};
use crate::error::Result;
use crate::services::{ContactBook, SettingsService};
use crate::storage::ContactStore;
use std::path::PathBuf;

/// Locations of the application's data files
#[derive(Debug, Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
}

impl AppState {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self { app_data_dir }
    }

    /// Data directory from the environment, else the working directory
    pub fn from_env() -> Self {
        let dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.app_data_dir.join(CONTACTS_FILE_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.app_data_dir.join(SETTINGS_FILE_NAME)
    }
}

/// Application setup - called once on startup
pub async fn setup(state: &AppState) -> Result<ContactBook> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", state.app_data_dir);

    tokio::fs::create_dir_all(&state.app_data_dir).await?;

    // Settings first so the theme is known before contacts are shown
    let settings_service = SettingsService::new(state.settings_path());
    let settings = settings_service.load().await;

    let store = ContactStore::new(state.contacts_path());
    let book = ContactBook::open(store, settings_service, settings).await;

    tracing::info!(
        "Application initialized with {} contacts, theme {}",
        book.len(),
        book.theme()
    );

    Ok(book)
}
