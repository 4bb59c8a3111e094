use async_trait::async_trait;
use bytes::Bytes;

use super::error::StorageError;

/// A key-addressed blob store.
///
/// Keys are validated relative paths such as `photos/<uuid>.png`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store `data` under `key`, replacing nothing: keys are never reused.
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Delete the object stored under `key`.
    ///
    /// Deleting a key that does not exist succeeds.
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}
