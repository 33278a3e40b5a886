//! # Image Store
//!
//! Storage for the single relayed image and read access for the static
//! image route.
//!
//! The store keeps one file name. Each [`ImageStore::store`] replaces the
//! previous image; concurrent writers resolve to last-writer-wins, and a
//! reader never observes a partially written file.

use async_trait::async_trait;
use bytes::Bytes;

/// Interface for image persistence.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Create the storage directory if it does not exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DirectoryUnavailable` if it cannot be created.
    async fn ensure_directory(&self) -> Result<(), StorageError>;

    /// Replace the retained image with `content`.
    ///
    /// Creates the storage directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be created or the file
    /// cannot be written.
    async fn store(&self, content: &[u8]) -> Result<StoredImage, StorageError>;

    /// Read a file from the storage directory by name.
    ///
    /// Returns `Ok(None)` when the name is not a plain file name inside the
    /// directory or the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for I/O failures other than "not found".
    async fn load(&self, file_name: &str) -> Result<Option<ImageFile>, StorageError>;

    /// Name the retained image is stored under.
    fn file_name(&self) -> &str;
}

/// Result of a successful [`ImageStore::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub size_bytes: u64,
}

/// A file read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub content: Bytes,
    pub content_type: &'static str,
}

/// Image storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid image file name: {name}")]
    InvalidFileName { name: String },

    #[error("Failed to create image directory {path}: {source}")]
    DirectoryUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write image {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read image {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Check if error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::InvalidFileName { .. } => false,
            Self::DirectoryUnavailable { .. } => false,
            Self::WriteFailed { .. } | Self::ReadFailed { .. } => true,
        }
    }
}

/// True when `name` is a single plain path component safe to join onto the
/// storage directory.
///
/// Rejects empty names, separators, NUL bytes and names starting with `.`;
/// the last rule covers `.`, `..`, hidden files and in-progress temporary
/// files. Dots inside a name (`photo..jpg`) are allowed.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\', '\0'])
}

/// Content type for a served file, chosen by extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[path = "image_store_tests.rs"]
mod tests;
