use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use super::error::StorageError;
use super::key::validate_key;
use super::traits::StorageBackend;

const OBJECTS_DIR: &str = "objects";
const STAGING_DIR: &str = "staging";

/// Filesystem-backed object store.
///
/// Objects live at `{root}/objects/{key}`. Writes go through
/// `{root}/staging` and are renamed into place, so a reader never observes a
/// partial object. Only the objects directory is meant to be served.
pub struct FilesystemBackend {
    objects: PathBuf,
    staging: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend, creating its directories under `root` if needed.
    pub async fn new(root: PathBuf) -> Result<Self, StorageError> {
        let objects = Self::objects_dir(&root);
        let staging = root.join(STAGING_DIR);
        fs::create_dir_all(&objects).await?;
        fs::create_dir_all(&staging).await?;
        Ok(Self { objects, staging })
    }

    /// Directory holding stored objects for a backend rooted at `root`.
    pub fn objects_dir(root: &Path) -> PathBuf {
        root.join(OBJECTS_DIR)
    }

    pub fn objects(&self) -> &Path {
        &self.objects
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.objects.join(validate_key(key)?))
    }

    fn temp_path(&self) -> PathBuf {
        self.staging.join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;

        let temp_path = self.temp_path();
        let staged = async {
            fs::write(&temp_path, &data).await?;
            if let Some(parent) = object_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::rename(&temp_path, &object_path).await
        };

        if let Err(e) = staged.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
