use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::StorageError;
use super::filesystem::FilesystemBackend;
use super::key::PublicUrl;
use super::traits::StorageBackend;
use crate::config::{StorageBackendKind, StorageConfig};
use crate::retry::{RetryPolicy, retry};

/// Upload/delete-by-URL facade over a [`StorageBackend`].
///
/// Every upload is written under `{folder}/{uuid}{extension}`; the name is
/// never derived from client input. Both calls are retried under the
/// configured policy. A failed upload attempt discards its key before the
/// next attempt picks a fresh one.
pub struct ObjectStorage {
    backend: Arc<dyn StorageBackend>,
    urls: PublicUrl,
    folder: String,
    retry: RetryPolicy,
}

impl ObjectStorage {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        urls: PublicUrl,
        folder: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            urls,
            folder: folder.into().trim_matches('/').to_string(),
            retry,
        }
    }

    /// Build the configured backend and wrap it.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let backend: Arc<dyn StorageBackend> = match config.backend {
            StorageBackendKind::Filesystem => {
                Arc::new(FilesystemBackend::new(config.filesystem.root.clone()).await?)
            }
            #[cfg(feature = "object-storage")]
            StorageBackendKind::S3 => {
                let s3 = config.s3.as_ref().ok_or_else(|| {
                    StorageError::Backend("storage.backend = \"s3\" requires [storage.s3]".into())
                })?;
                Arc::new(super::s3::S3Backend::new(s3)?)
            }
            #[cfg(not(feature = "object-storage"))]
            StorageBackendKind::S3 => {
                return Err(StorageError::Backend(
                    "S3 support is not compiled in (enable the `object-storage` feature)".into(),
                ));
            }
        };

        info!(
            backend = ?config.backend,
            folder = %config.folder,
            public_base_url = %config.public_base_url,
            "Object storage ready"
        );

        Ok(Self::new(
            backend,
            PublicUrl::new(config.public_base_url.clone()),
            config.folder.clone(),
            config.retry.clone(),
        ))
    }

    pub fn public_url(&self) -> &PublicUrl {
        &self.urls
    }

    /// Store `data` and return its durable URL.
    ///
    /// `extension` is a pre-validated suffix such as `.png`.
    pub async fn upload(
        &self,
        data: Bytes,
        extension: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let extension = sanitize_extension(extension);

        retry(
            &self.retry,
            "object upload",
            StorageError::is_transient,
            |attempt| {
                let data = data.clone();
                let key = self.generate_key(&extension);
                async move {
                    match self.backend.put_object(&key, data, content_type).await {
                        Ok(()) => {
                            debug!(key = %key, attempt, "Object stored");
                            Ok(self.urls.url_for(&key))
                        }
                        Err(err) => {
                            // The attempt may have left a partial object behind.
                            if let Err(cleanup) = self.backend.delete_object(&key).await {
                                warn!(key = %key, error = %cleanup, "Failed to discard key of failed upload");
                            }
                            Err(err)
                        }
                    }
                }
            },
        )
        .await
    }

    /// Delete the object behind a URL previously returned by [`ObjectStorage::upload`].
    pub async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = self.urls.key_for(url)?;
        retry(
            &self.retry,
            "object delete",
            StorageError::is_transient,
            |_| self.backend.delete_object(key),
        )
        .await?;
        debug!(key, "Object deleted");
        Ok(())
    }

    fn generate_key(&self, extension: &str) -> String {
        format!("{}/{}{}", self.folder, Uuid::new_v4(), extension)
    }
}

/// Lowercased `.ext`, or empty if the suffix has anything but ASCII alphanumerics.
fn sanitize_extension(extension: &str) -> String {
    let bare = extension.trim_start_matches('.');
    if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
        return String::new();
    }
    format!(".{}", bare.to_ascii_lowercase())
}
