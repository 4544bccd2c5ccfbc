use async_trait::async_trait;

use crate::{domain::RemoteFileMeta, extract::DocumentFormat, Result};

/// Where the object registry CSV comes from.
///
/// Implementations fail with `RegistryError::FetchFailed` on transport
/// errors or a non-success status.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    async fn fetch_csv(&self) -> Result<String>;
}

/// Hexagonal port for the cloud-storage provider's public-link API.
///
/// Locators are opaque public references; implementations pass them through.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// List the files (never directories) directly inside a shared folder.
    ///
    /// Bounded to a single page; entries beyond the page ceiling are not returned.
    async fn list_files(&self, locator: &str) -> Result<Vec<RemoteFileMeta>>;

    /// Download one file from a shared folder by its path within the share.
    async fn download_file(&self, locator: &str, path: &str) -> Result<Vec<u8>>;
}

/// Bytes -> text capability, dispatched per document format.
///
/// Implementations never fail; unreadable units contribute empty text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, format: DocumentFormat, bytes: &[u8]) -> String;
}
