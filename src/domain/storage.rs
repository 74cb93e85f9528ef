//! Storage trait definitions
//!
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;

/// A file stored by a media backend.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Public URL the file is reachable at
    pub url: String,
    /// Path relative to the storage root (`<category>/<filename>`)
    pub key: String,
}

/// Remote media host (FTP in production).
///
/// Every call opens its own session and closes it before returning,
/// whether the transfer succeeded or not.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload `data` as `<category>/<filename>` under the store's base directory
    async fn put(
        &self,
        category: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<StoredFile, DomainError>;
}
