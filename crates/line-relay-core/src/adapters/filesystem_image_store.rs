//! # Filesystem Image Store Adapter
//!
//! Local directory implementation of [`ImageStore`].

use crate::image_store::*;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Filesystem-based image store.
///
/// Writes go to a uniquely named hidden temp file in the same directory and
/// are renamed over the target, so the served file is always a complete
/// image.
///
/// # Examples
///
/// ```no_run
/// use line_relay_core::adapters::FilesystemImageStore;
/// use line_relay_core::ImageStore;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FilesystemImageStore::new("image", "test.jpg")?;
/// let stored = store.store(b"\xFF\xD8\xFF").await?;
/// assert_eq!(stored.file_name, "test.jpg");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FilesystemImageStore {
    image_dir: PathBuf,
    file_name: String,
}

impl FilesystemImageStore {
    /// Create a store rooted at `image_dir`.
    ///
    /// The directory is created lazily on the first write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidFileName` if `file_name` is not a plain
    /// file name.
    pub fn new(
        image_dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let file_name = file_name.into();
        if !is_plain_file_name(&file_name) {
            return Err(StorageError::InvalidFileName { name: file_name });
        }

        Ok(Self {
            image_dir: image_dir.into(),
            file_name,
        })
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Path of the retained image.
    pub fn image_path(&self) -> PathBuf {
        self.image_dir.join(&self.file_name)
    }

    fn temp_path(&self) -> PathBuf {
        self.image_dir.join(format!(
            ".{}.{}.tmp",
            self.file_name,
            uuid::Uuid::new_v4().simple()
        ))
    }

    async fn write_temp(&self, temp_path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(content).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn ensure_directory(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.image_dir)
            .await
            .map_err(|e| StorageError::DirectoryUnavailable {
                path: self.image_dir.display().to_string(),
                source: e,
            })
    }

    async fn store(&self, content: &[u8]) -> Result<StoredImage, StorageError> {
        self.ensure_directory().await?;

        let target = self.image_path();
        let temp_path = self.temp_path();

        if let Err(e) = self.write_temp(&temp_path, content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFailed {
                path: target.display().to_string(),
                source: e,
            });
        }

        // Rename over the target (atomic on the same filesystem)
        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFailed {
                path: target.display().to_string(),
                source: e,
            });
        }

        debug!(
            path = %target.display(),
            size_bytes = content.len(),
            "Stored image"
        );

        Ok(StoredImage {
            file_name: self.file_name.clone(),
            size_bytes: content.len() as u64,
        })
    }

    async fn load(&self, file_name: &str) -> Result<Option<ImageFile>, StorageError> {
        if !is_plain_file_name(file_name) {
            return Ok(None);
        }

        let requested = self.image_dir.join(file_name);

        // Resolve links and confirm the file stays inside the directory
        let canonical_dir = match fs::canonicalize(&self.image_dir).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: self.image_dir.display().to_string(),
                    source: e,
                })
            }
        };
        let canonical_file = match fs::canonicalize(&requested).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: requested.display().to_string(),
                    source: e,
                })
            }
        };
        if !canonical_file.starts_with(&canonical_dir) {
            debug!(file_name, "Rejected image path outside storage directory");
            return Ok(None);
        }

        match fs::metadata(&canonical_file).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: requested.display().to_string(),
                    source: e,
                })
            }
        }

        match fs::read(&canonical_file).await {
            Ok(content) => Ok(Some(ImageFile {
                content: Bytes::from(content),
                content_type: content_type_for(file_name),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                path: requested.display().to_string(),
                source: e,
            }),
        }
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[cfg(test)]
#[path = "filesystem_image_store_tests.rs"]
mod tests;
