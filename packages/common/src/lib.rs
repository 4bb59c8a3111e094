pub mod config;
pub mod retry;
pub mod storage;

pub use config::{S3Config, StorageBackendKind, StorageConfig};
pub use retry::RetryPolicy;
