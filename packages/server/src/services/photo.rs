use std::path::Path;

use axum::body::Bytes;
use chrono::Utc;
use common::StorageConfig;
use common::retry::{RetryPolicy, retry};
use common::storage::{ObjectStorage, StorageError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};
use tracing::{debug, error, info, warn};

use crate::database::is_transient;
use crate::entity::photo;
use crate::error::AppError;

/// Image extensions accepted for upload, lowercase and without the dot.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Non-file fields of a photo.
#[derive(Debug, Clone, Default)]
pub struct PhotoInput {
    pub title: String,
    pub caption: String,
}

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub data: Bytes,
}

/// Failure of a photo operation, naming which side effects already happened.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("{0}")]
    Invalid(String),
    #[error("photo not found")]
    NotFound,
    /// Nothing was stored and the row is unchanged.
    #[error("photo upload failed: {0}")]
    UploadFailed(#[source] StorageError),
    /// The new blob was stored but the row was not written.
    #[error("photo record could not be saved (upload rolled back: {compensated}): {source}")]
    PersistFailed {
        #[source]
        source: DbErr,
        compensated: bool,
    },
    /// The blob is still stored and the row was kept.
    #[error("stored photo could not be deleted: {0}")]
    BlobDeleteFailed(#[source] StorageError),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::Invalid(msg) => AppError::Validation(msg),
            PhotoError::NotFound => AppError::NotFound("Photo not found".into()),
            PhotoError::UploadFailed(e) => {
                error!(error = %e, "Photo upload failed");
                AppError::Dependency("photo upload failed; nothing was saved".into())
            }
            PhotoError::PersistFailed {
                source,
                compensated,
            } => {
                error!(error = %source, compensated, "Photo record could not be saved");
                let msg = if compensated {
                    "photo was uploaded but the record could not be saved; the upload was rolled back"
                } else {
                    "photo was uploaded but the record could not be saved; the uploaded file could not be removed"
                };
                AppError::Dependency(msg.into())
            }
            PhotoError::BlobDeleteFailed(e) => {
                error!(error = %e, "Stored photo could not be deleted");
                AppError::Dependency("stored photo could not be deleted; the photo was kept".into())
            }
            PhotoError::Database(e) => AppError::from(e),
        }
    }
}

/// Keeps a photo row and its stored blob consistent.
///
/// Ordering rules:
/// - create: upload, then insert; a failed insert deletes the new blob.
/// - update: upload new, write new URL, then delete old; a failed write
///   deletes the new blob and leaves the old one alone.
/// - delete: delete blob, then soft-delete the row; a failed blob delete
///   keeps the row.
pub struct PhotoService<'a, C: ConnectionTrait> {
    conn: &'a C,
    storage: &'a ObjectStorage,
    retry: &'a RetryPolicy,
    max_upload_bytes: usize,
}

impl<'a, C: ConnectionTrait> PhotoService<'a, C> {
    pub fn new(conn: &'a C, storage: &'a ObjectStorage, config: &'a StorageConfig) -> Self {
        Self {
            conn,
            storage,
            retry: &config.retry,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Look up a live photo.
    pub async fn find(&self, id: i32) -> Result<photo::Model, PhotoError> {
        retry(self.retry, "photo lookup", is_transient, |_| {
            photo::Entity::find_by_id(id)
                .filter(photo::Column::DeletedAt.is_null())
                .one(self.conn)
        })
        .await?
        .ok_or(PhotoError::NotFound)
    }

    pub async fn create(
        &self,
        owner_id: i32,
        input: PhotoInput,
        upload: PhotoUpload,
    ) -> Result<photo::Model, PhotoError> {
        let (title, caption) = validate_input(&input)?;
        let extension = self.validate_upload(&upload)?;

        let url = self.store(upload.data, extension).await?;

        let now = Utc::now();
        let model = photo::ActiveModel {
            title: Set(title),
            caption: Set(caption),
            photo_url: Set(url.clone()),
            user_id: Set(Some(owner_id)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        match model.insert(self.conn).await {
            Ok(photo) => {
                info!(photo_id = photo.id, owner_id, "Photo created");
                Ok(photo)
            }
            Err(source) => Err(PhotoError::PersistFailed {
                compensated: self.compensate(&url).await,
                source,
            }),
        }
    }

    /// Overwrite title and caption, and swap the image if `upload` is given.
    pub async fn update(
        &self,
        id: i32,
        input: PhotoInput,
        upload: Option<PhotoUpload>,
    ) -> Result<photo::Model, PhotoError> {
        let existing = self.find(id).await?;
        let (title, caption) = validate_input(&input)?;
        let extension = upload
            .as_ref()
            .map(|u| self.validate_upload(u))
            .transpose()?;

        let new_url = match (upload, extension) {
            (Some(upload), Some(extension)) => Some(self.store(upload.data, extension).await?),
            _ => None,
        };

        let old_url = existing.photo_url.clone();
        let mut active = existing.into_active_model();
        active.title = Set(title);
        active.caption = Set(caption);
        active.updated_at = Set(Utc::now());
        if let Some(url) = &new_url {
            active.photo_url = Set(url.clone());
        }

        let written = retry(self.retry, "photo update", is_transient, |_| {
            active.clone().update(self.conn)
        })
        .await;

        let photo = match (written, &new_url) {
            (Ok(photo), _) => photo,
            (Err(source), Some(url)) => {
                return Err(PhotoError::PersistFailed {
                    compensated: self.compensate(url).await,
                    source,
                });
            }
            (Err(e), None) => return Err(PhotoError::Database(e)),
        };

        if new_url.is_some() {
            match self.storage.delete(&old_url).await {
                Ok(()) => debug!(photo_id = id, url = %old_url, "Replaced photo blob removed"),
                Err(e) => warn!(
                    photo_id = id,
                    url = %old_url,
                    error = %e,
                    "Replaced photo blob left behind"
                ),
            }
        }

        info!(photo_id = id, replaced_image = new_url.is_some(), "Photo updated");
        Ok(photo)
    }

    /// Delete the blob, then soft-delete the row.
    pub async fn delete(&self, id: i32) -> Result<(), PhotoError> {
        let existing = self.find(id).await?;

        if let Err(e) = self.storage.delete(&existing.photo_url).await {
            error!(photo_id = id, url = %existing.photo_url, error = %e, "Photo blob delete failed, keeping row");
            return Err(PhotoError::BlobDeleteFailed(e));
        }

        let mut active = existing.into_active_model();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        retry(self.retry, "photo soft delete", is_transient, |_| {
            active.clone().update(self.conn)
        })
        .await?;

        info!(photo_id = id, "Photo deleted");
        Ok(())
    }

    /// Check the file name and size. Returns the normalized extension.
    fn validate_upload(&self, upload: &PhotoUpload) -> Result<&'static str, PhotoError> {
        let extension = allowed_extension(&upload.file_name).ok_or_else(|| {
            PhotoError::Invalid(format!(
                "photo must be one of: {}",
                ALLOWED_EXTENSIONS
                    .iter()
                    .map(|e| format!(".{e}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;
        if upload.data.is_empty() {
            return Err(PhotoError::Invalid("photo file is empty".into()));
        }
        if upload.data.len() > self.max_upload_bytes {
            return Err(PhotoError::Invalid(format!(
                "photo must be at most {} bytes",
                self.max_upload_bytes
            )));
        }
        Ok(extension)
    }

    async fn store(&self, data: Bytes, extension: &str) -> Result<String, PhotoError> {
        let content_type = mime_guess::from_ext(extension)
            .first_or_octet_stream()
            .to_string();
        let url = self
            .storage
            .upload(data, extension, &content_type)
            .await
            .map_err(PhotoError::UploadFailed)?;
        debug!(url = %url, "Photo blob uploaded");
        Ok(url)
    }

    /// Remove a blob whose row was never written. Returns whether it is gone.
    async fn compensate(&self, url: &str) -> bool {
        match self.storage.delete(url).await {
            Ok(()) => {
                warn!(url, "Rolled back upload after failed write");
                true
            }
            Err(e) => {
                error!(url, error = %e, "Could not roll back upload; blob is orphaned");
                false
            }
        }
    }
}

/// Trimmed `(title, caption)`, both required.
fn validate_input(input: &PhotoInput) -> Result<(String, String), PhotoError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(PhotoError::Invalid("title is required".into()));
    }
    let caption = input.caption.trim();
    if caption.is_empty() {
        return Err(PhotoError::Invalid("caption is required".into()));
    }
    Ok((title.to_string(), caption.to_string()))
}

/// The allow-listed extension of `file_name`, matched case-insensitively.
fn allowed_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.into_iter().find(|allowed| *allowed == ext)
}
