use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The S3 client reported a failure.
    #[cfg(feature = "object-storage")]
    #[error("S3 error: {0}")]
    S3(#[from] s3::error::S3Error),
    /// The URL does not point into this store's public namespace.
    #[error("object URL is not managed by this store: {0}")]
    ForeignUrl(String),
    /// The object key failed validation.
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    /// The backend answered, but refused the request.
    #[error("storage backend rejected the request: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(err) => !matches!(
                err.kind(),
                std::io::ErrorKind::NotFound
                    | std::io::ErrorKind::PermissionDenied
                    | std::io::ErrorKind::InvalidInput
            ),
            #[cfg(feature = "object-storage")]
            Self::S3(_) => true,
            Self::Backend(_) => true,
            Self::ForeignUrl(_) | Self::InvalidKey(_) => false,
        }
    }
}
