mod error;
mod key;
mod object_storage;
mod traits;

pub mod filesystem;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use key::{PublicUrl, validate_key};
pub use object_storage::ObjectStorage;
pub use traits::StorageBackend;
