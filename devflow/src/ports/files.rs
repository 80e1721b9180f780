//! Filesystem-backed artifact store.

use super::FileStore;
use crate::errors::DevflowError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes artifacts below a root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn write(&self, path: &Path, content: &str) -> Result<(), DevflowError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DevflowError::file(parent, e))?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| DevflowError::file(&full, e))?;
        info!(path = %full.display(), bytes = content.len(), "File saved");
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<String, DevflowError> {
        let full = self.resolve(path);
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| DevflowError::file(full, e))
    }
}
