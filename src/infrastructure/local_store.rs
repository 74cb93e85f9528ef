//! Local disk media storage

use std::path::PathBuf;

use crate::domain::{DomainError, StoredFile};

pub struct LocalStore {
    root: PathBuf,
    public_url: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Write `data` to `<root>/<category>/<filename>`, creating the
    /// category directory on demand.
    pub async fn save(
        &self,
        category: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<StoredFile, DomainError> {
        let dir = self.root.join(category);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DomainError::Storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(filename);
        tokio::fs::write(&path, data).await.map_err(|e| {
            DomainError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        let key = format!("{}/{}", category, filename);
        Ok(StoredFile {
            url: format!("{}/{}", self.public_url, key),
            key,
        })
    }

    /// Read a file by its path relative to the root. The caller validates
    /// the path first.
    pub async fn read(&self, relative: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.root.join(relative)).await
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(key)).await {
            tracing::warn!("Failed to remove {}: {}", key, e);
        }
    }
}
