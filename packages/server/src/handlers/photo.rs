use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::entity::photo;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::path::AppPath;
use crate::models::photo::{PhotoForm, PhotoResponse};
use crate::models::shared::DeleteResponse;
use crate::services::photo::{PhotoInput, PhotoService, PhotoUpload};
use crate::state::AppState;
use crate::utils::owner::{load_owner, load_owners};
use crate::utils::ownership::{self, ResourceKind};

pub fn photo_body_limit(max_upload_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_upload_bytes)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Photos",
    operation_id = "listPhotos",
    summary = "List all photos",
    responses(
        (status = 200, description = "Photos with their owners", body = Vec<PhotoResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_photos(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PhotoResponse>>, AppError> {
    let photos = photo::Entity::find()
        .filter(photo::Column::DeletedAt.is_null())
        .order_by_asc(photo::Column::Id)
        .all(&state.db)
        .await?;

    let owners = load_owners(&state.db, photos.iter().map(|p| p.user_id)).await?;

    Ok(Json(
        photos
            .into_iter()
            .map(|p| {
                let owner = p.user_id.and_then(|id| owners.get(&id).cloned());
                PhotoResponse::from(p).with_owner(owner)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{photo_id}",
    tag = "Photos",
    operation_id = "getPhoto",
    summary = "Get a photo by ID",
    params(("photo_id" = i32, Path, description = "Photo ID")),
    responses(
        (status = 200, description = "Photo with its owner", body = PhotoResponse),
        (status = 400, description = "Non-numeric ID (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(photo_id): AppPath<i32>,
) -> Result<Json<PhotoResponse>, AppError> {
    let photo = service(&state).find(photo_id).await?;
    let owner = load_owner(&state.db, photo.user_id).await?;
    Ok(Json(PhotoResponse::from(photo).with_owner(owner)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Photos",
    operation_id = "createPhoto",
    summary = "Upload a new photo",
    description = "Multipart form with `title`, `caption` and a `photo` file \
        (.jpg, .jpeg, .png or .webp). The image is stored first and the record \
        is written only after the upload succeeds.",
    request_body(content = PhotoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo created", body = PhotoResponse),
        (status = 400, description = "Validation error or wrong content type (VALIDATION_ERROR, BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Request body too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Object storage or database failed (DEPENDENCY_FAILURE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, multipart), fields(user_id = auth_user.user_id))]
pub async fn create_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let multipart = accept_multipart(&state, &headers, multipart)?;
    let (input, upload) = read_photo_form(multipart).await?;
    let upload = upload.ok_or_else(|| AppError::Validation("photo is required".into()))?;

    let photo = service(&state)
        .create(auth_user.user_id, input, upload)
        .await?;

    Ok((StatusCode::CREATED, Json(PhotoResponse::from(photo))))
}

#[utoipa::path(
    put,
    path = "/{photo_id}",
    tag = "Photos",
    operation_id = "updatePhoto",
    summary = "Update a photo",
    description = "Multipart form with `title`, `caption` and an optional `photo` file. \
        Without a file the stored image is kept. With a file the new image is stored, \
        the record is pointed at it, and only then is the old image removed.",
    params(("photo_id" = i32, Path, description = "Photo ID")),
    request_body(content = PhotoForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo updated", body = PhotoResponse),
        (status = 400, description = "Validation error or wrong content type (VALIDATION_ERROR, BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Request body too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Object storage or database failed (DEPENDENCY_FAILURE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, multipart), fields(user_id = auth_user.user_id))]
pub async fn update_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(photo_id): AppPath<i32>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoResponse>, AppError> {
    let multipart = accept_multipart(&state, &headers, multipart)?;
    ownership::authorize(&state.db, ResourceKind::Photo, photo_id, auth_user.user_id).await?;

    let (input, upload) = read_photo_form(multipart).await?;
    let photo = service(&state).update(photo_id, input, upload).await?;

    Ok(Json(PhotoResponse::from(photo)))
}

#[utoipa::path(
    delete,
    path = "/{photo_id}",
    tag = "Photos",
    operation_id = "deletePhoto",
    summary = "Delete a photo",
    description = "Removes the stored image first. If that fails the photo is kept.",
    params(("photo_id" = i32, Path, description = "Photo ID")),
    responses(
        (status = 200, description = "Photo deleted", body = DeleteResponse),
        (status = 400, description = "Non-numeric ID (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Object storage or database failed (DEPENDENCY_FAILURE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(photo_id): AppPath<i32>,
) -> Result<Json<DeleteResponse>, AppError> {
    ownership::authorize(&state.db, ResourceKind::Photo, photo_id, auth_user.user_id).await?;

    service(&state).delete(photo_id).await?;

    Ok(Json(DeleteResponse::new("photo", photo_id)))
}

fn service(state: &AppState) -> PhotoService<'_, sea_orm::DatabaseConnection> {
    PhotoService::new(&state.db, &state.storage, &state.config.storage)
}

/// Reject non-multipart bodies and bodies declared larger than the limit
/// before any field is read.
fn accept_multipart(
    state: &AppState,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, AppError> {
    let multipart =
        multipart.map_err(|_| AppError::BadRequest("invalid content type".into()))?;

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if let Some(len) = declared
        && len > state.config.storage.max_upload_bytes as u64
    {
        return Err(AppError::PayloadTooLarge);
    }

    Ok(multipart)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

/// Collect `title`, `caption` and the optional `photo` file. Unknown fields
/// are ignored; a `photo` part with no file name and no content counts as absent.
async fn read_photo_form(
    mut multipart: Multipart,
) -> Result<(PhotoInput, Option<PhotoUpload>), AppError> {
    let mut input = PhotoInput::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => input.title = field.text().await.map_err(multipart_error)?,
            Some("caption") => input.caption = field.text().await.map_err(multipart_error)?,
            Some("photo") => {
                let file_name = field.file_name().map(str::to_owned).unwrap_or_default();
                let data = field.bytes().await.map_err(multipart_error)?;
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                if file_name.is_empty() {
                    return Err(AppError::Validation("photo must be sent as a file".into()));
                }
                upload = Some(PhotoUpload { file_name, data });
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok((input, upload))
}
