//! Document persistence
//!
//! The editor only needs a record store: load, save, list and delete JSON
//! documents by id. [`JsonDirStore`] keeps one pretty-printed file per
//! document; [`MemoryStore`] keeps serialized documents in memory.

use crate::{Result, RuntimeError};
use menu_pagination::Document;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

pub trait DocumentStore: Send + Sync {
    fn load(&self, id: &str) -> impl Future<Output = Result<Document>> + Send;
    fn save(&self, id: &str, document: &Document) -> impl Future<Output = Result<()>> + Send;
    /// Ids of every stored document, sorted
    fn list(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
    /// Returns whether a document was removed
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// Ids become file names, so keep them to a safe alphabet
fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !id.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(RuntimeError::InvalidId(id.to_string()))
    }
}

fn to_json(document: &Document) -> Result<String> {
    serde_json::to_string_pretty(document)
        .map_err(|e| RuntimeError::Store(format!("Failed to serialize document: {e}")))
}

fn from_json(id: &str, json: &str) -> Result<Document> {
    serde_json::from_str(json)
        .map_err(|e| RuntimeError::Store(format!("Failed to parse document '{id}': {e}")))
}

// =============================================================================
// JSON directory
// =============================================================================

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl DocumentStore for JsonDirStore {
    async fn load(&self, id: &str) -> Result<Document> {
        let path = self.path(id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RuntimeError::NotFound(id.to_string()));
            }
            Err(e) => {
                return Err(RuntimeError::Store(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        from_json(id, &json)
    }

    async fn save(&self, id: &str, document: &Document) -> Result<()> {
        let path = self.path(id)?;
        let json = to_json(document)?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            RuntimeError::Store(format!("Failed to create {}: {e}", self.root.display()))
        })?;

        // Write next to the target and rename so readers never see half a file
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await.map_err(|e| {
            RuntimeError::Store(format!("Failed to write {}: {e}", staging.display()))
        })?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| RuntimeError::Store(format!("Failed to write {}: {e}", path.display())))?;

        log::debug!("Saved document '{id}' to {}", path.display());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RuntimeError::Store(format!(
                    "Failed to list {}: {e}",
                    self.root.display()
                )));
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RuntimeError::Store(format!("Failed to list documents: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RuntimeError::Store(format!(
                "Failed to delete {}: {e}",
                path.display()
            ))),
        }
    }
}

// =============================================================================
// In memory
// =============================================================================

/// Shares its contents between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<BTreeMap<String, String>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every save fail until switched off again
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryStore {
    async fn load(&self, id: &str) -> Result<Document> {
        validate_id(id)?;
        let documents = self.documents.lock().await;
        let json = documents
            .get(id)
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))?;
        from_json(id, json)
    }

    async fn save(&self, id: &str, document: &Document) -> Result<()> {
        validate_id(id)?;
        if self.failing.load(Ordering::SeqCst) {
            return Err(RuntimeError::Store(format!("Store unavailable for '{id}'")));
        }
        let json = to_json(document)?;
        self.documents.lock().await.insert(id.to_string(), json);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.documents.lock().await.keys().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        validate_id(id)?;
        Ok(self.documents.lock().await.remove(id).is_some())
    }
}
