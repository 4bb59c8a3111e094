use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::key::validate_key;
use super::traits::StorageBackend;
use crate::config::S3Config;

/// Object store backed by an S3-compatible bucket.
pub struct S3Backend {
    bucket: Box<Bucket>,
}

impl S3Backend {
    pub fn new(config: &S3Config) -> Result<Self, StorageError> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }
}

fn check_status(status: u16, action: &str, key: &str) -> Result<(), StorageError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(StorageError::Backend(format!(
            "{action} {key} returned HTTP {status}"
        )))
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let key = validate_key(key)?;
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await?;
        debug!(key, status = response.status_code(), "S3 put_object");
        check_status(response.status_code(), "PUT", key)
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let key = validate_key(key)?;
        let response = self.bucket.delete_object(key).await?;
        debug!(key, status = response.status_code(), "S3 delete_object");
        if response.status_code() == 404 {
            return Ok(());
        }
        check_status(response.status_code(), "DELETE", key)
    }
}
