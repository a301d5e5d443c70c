//! Document storage
//!
//! The ledger only ever loads and saves the whole document, so a store is
//! two calls. [`JsonFileStore`] is what the server runs on; [`MemoryStore`]
//! backs tests and embedding.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::error::{CoreError, CoreResult};
use super::models::Document;

/// Trait for document stores
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the full document. A store with nothing saved yields an empty one.
    async fn load(&self) -> CoreResult<Document>;

    /// Replace the stored document
    async fn save(&self, document: &Document) -> CoreResult<()>;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

/// Document persisted as one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Toggle 2-space pretty printing (on by default)
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> CoreResult<PathBuf> {
        let file_name = self.path.file_name().ok_or_else(|| CoreError::StorageError {
            message: format!("{} is not a file path", self.path.display()),
        })?;
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        Ok(self.path.with_file_name(temp_name))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> CoreResult<Document> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(Document::default());
            }
            Err(e) => {
                return Err(CoreError::StorageError {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                })
            }
        };

        Document::from_json(&content).map_err(|e| match e {
            CoreError::InvalidFormat { message } => CoreError::InvalidFormat {
                message: format!("{}: {}", self.path.display(), message),
            },
            other => other,
        })
    }

    async fn save(&self, document: &Document) -> CoreResult<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        }
        .map_err(|e| CoreError::InternalError {
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write beside the target and rename over it, so readers never see a
        // half-written file.
        let temp = self.temp_path()?;
        tokio::fs::write(&temp, &bytes).await.map_err(|e| CoreError::StorageError {
            message: format!("failed to write {}: {}", temp.display(), e),
        })?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            log::warn!("Removing {} after failed replace", temp.display());
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(CoreError::StorageError {
                message: format!("failed to replace {}: {}", self.path.display(), e),
            });
        }

        log::debug!("Saved {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Document>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document: RwLock::new(document),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

fn poisoned() -> CoreError {
    CoreError::InternalError {
        message: "memory store lock poisoned".to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> CoreResult<Document> {
        let guard = self.document.read().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    async fn save(&self, document: &Document) -> CoreResult<()> {
        let mut guard = self.document.write().map_err(|_| poisoned())?;
        *guard = document.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
