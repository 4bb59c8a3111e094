use std::path::PathBuf;

use serde::Deserialize;

use crate::retry::RetryPolicy;

/// Which storage backend holds uploaded objects.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Filesystem,
    S3,
}

/// App-level object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Storage backend. Default: `filesystem`.
    #[serde(default = "default_backend")]
    pub backend: StorageBackendKind,
    /// Logical folder every upload is namespaced under. Default: "photos".
    #[serde(default = "default_folder")]
    pub folder: String,
    /// URL prefix under which stored objects are publicly reachable.
    /// Default: "http://127.0.0.1:3000/media".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Request-wide body ceiling for upload endpoints, in bytes. Default: 2 MiB.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub filesystem: FilesystemConfig,
    /// Required when `backend = "s3"`.
    #[serde(default)]
    pub s3: Option<S3Config>,
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemConfig {
    /// Backend root: objects live under `objects/`, in-flight writes under
    /// `staging/`. Default: "./data/media".
    #[serde(default = "default_filesystem_root")]
    pub root: PathBuf,
}

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style addressing (`endpoint/bucket/key`).
    #[serde(default)]
    pub path_style: bool,
}

fn default_backend() -> StorageBackendKind {
    StorageBackendKind::Filesystem
}
fn default_folder() -> String {
    "photos".into()
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:3000/media".into()
}
fn default_max_upload_bytes() -> usize {
    2 * 1024 * 1024
}
fn default_filesystem_root() -> PathBuf {
    PathBuf::from("./data/media")
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_filesystem_root(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            folder: default_folder(),
            public_base_url: default_public_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
            filesystem: FilesystemConfig::default(),
            s3: None,
            retry: RetryPolicy::default(),
        }
    }
}
