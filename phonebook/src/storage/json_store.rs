//! JSON document storage
//!
//! One store per document file. Writes go to a sibling temp file which is
//! synced and then renamed over the target, so a failed write never
//! truncates previously saved data. Reads fold every object key to
//! lowercase so hand-edited files with different casing still load.

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File-backed JSON document
#[derive(Clone)]
pub struct JsonStore {
    path: PathBuf,
    // Held across temp-write + rename; shared by clones so saves to one path never overlap
    write_lock: Arc<Mutex<()>>,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute form of the path, for messages
    pub fn resolved_path(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    /// Read and parse the document. A missing file yields `Ok(None)`.
    pub async fn read<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No data file at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(self.read_error(e)),
        };

        let value: Value = serde_json::from_str(&content).map_err(|e| self.read_error(e))?;
        let document = serde_json::from_value(fold_keys(value)).map_err(|e| self.read_error(e))?;

        tracing::debug!("Read {} bytes from {:?}", content.len(), self.path);

        Ok(Some(document))
    }

    /// Serialize as indented JSON and replace the file atomically
    pub async fn write<T: Serialize>(&self, document: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(document).map_err(|e| self.write_error(e))?;

        let _guard = self.write_lock.lock().await;

        if let Err(e) = self.replace_contents(content.as_bytes()).await {
            // Best effort; the original file is untouched either way
            let _ = fs::remove_file(self.temp_path()).await;
            return Err(self.write_error(e));
        }

        tracing::debug!("Wrote {} bytes to {:?}", content.len(), self.path);

        Ok(())
    }

    async fn replace_contents(&self, data: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn read_error(&self, e: impl std::fmt::Display) -> AppError {
        AppError::PersistenceRead {
            path: self.resolved_path(),
            reason: e.to_string(),
        }
    }

    fn write_error(&self, e: impl std::fmt::Display) -> AppError {
        AppError::PersistenceWrite {
            path: self.resolved_path(),
            reason: e.to_string(),
        }
    }
}

/// Lowercase every object key, recursively. On collision the later key wins.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (key.to_lowercase(), fold_keys(inner)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}
