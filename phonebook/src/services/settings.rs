//! Settings service
//!
//! Manages application settings persistence using JSON file storage.
//! Settings are non-critical: read and write failures are logged and
//! otherwise ignored.

use crate::error::Result;
use crate::models::AppSettings;
use crate::storage::JsonStore;
use std::path::PathBuf;

/// Service for loading and saving application settings
#[derive(Clone)]
pub struct SettingsService {
    store: JsonStore,
}

impl SettingsService {
    pub fn new(settings_path: PathBuf) -> Self {
        Self {
            store: JsonStore::new(settings_path),
        }
    }

    /// Load settings, falling back to defaults when the file is missing or unreadable
    pub async fn load(&self) -> AppSettings {
        match self.try_load().await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                tracing::info!("Settings file not found, using default settings");
                AppSettings::default()
            }
            Err(e) => {
                tracing::debug!("Ignoring unreadable settings: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Save settings; failures are logged, never surfaced
    pub async fn save(&self, settings: &AppSettings) {
        if let Err(e) = self.try_save(settings).await {
            tracing::debug!("Ignoring settings save failure: {}", e);
        }
    }

    pub async fn try_load(&self) -> Result<Option<AppSettings>> {
        self.store.read().await
    }

    pub async fn try_save(&self, settings: &AppSettings) -> Result<()> {
        self.store.write(settings).await?;
        tracing::info!("Settings saved to {:?}", self.store.path());
        Ok(())
    }
}
