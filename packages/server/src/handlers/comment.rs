use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::comment;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::comment::{CommentRequest, CommentResponse, validate_comment_request};
use crate::models::shared::DeleteResponse;
use crate::state::AppState;
use crate::utils::owner::{load_owner, load_owners};
use crate::utils::ownership::{self, ResourceKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Comments",
    operation_id = "listComments",
    summary = "List comments on a photo",
    params(("photo_id" = i32, Path, description = "Photo ID")),
    responses(
        (status = 200, description = "Comments with their authors", body = Vec<CommentResponse>),
        (status = 400, description = "Non-numeric ID (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_comments(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(photo_id): AppPath<i32>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    require_photo(&state.db, photo_id).await?;

    let comments = comment::Entity::find()
        .filter(comment::Column::PhotoId.eq(photo_id))
        .filter(comment::Column::DeletedAt.is_null())
        .order_by_asc(comment::Column::Id)
        .all(&state.db)
        .await?;

    let owners = load_owners(&state.db, comments.iter().map(|c| c.user_id)).await?;

    Ok(Json(
        comments
            .into_iter()
            .map(|c| {
                let owner = c.user_id.and_then(|id| owners.get(&id).cloned());
                CommentResponse::from(c).with_owner(owner)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{comment_id}",
    tag = "Comments",
    operation_id = "getComment",
    summary = "Get a comment by ID",
    params(
        ("photo_id" = i32, Path, description = "Photo ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 200, description = "Comment with its author", body = CommentResponse),
        (status = 400, description = "Non-numeric ID (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo or comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((photo_id, comment_id)): AppPath<(i32, i32)>,
) -> Result<Json<CommentResponse>, AppError> {
    require_photo(&state.db, photo_id).await?;
    let comment = find_comment(&state.db, photo_id, comment_id).await?;
    let owner = load_owner(&state.db, comment.user_id).await?;
    Ok(Json(CommentResponse::from(comment).with_owner(owner)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on a photo",
    description = "Any authenticated user may comment on any photo.",
    params(("photo_id" = i32, Path, description = "Photo ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(photo_id): AppPath<i32>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = validate_comment_request(&payload)?;
    require_photo(&state.db, photo_id).await?;

    let now = Utc::now();
    let model = comment::ActiveModel {
        message: Set(message),
        user_id: Set(Some(auth_user.user_id)),
        photo_id: Set(Some(photo_id)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    let comment = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

#[utoipa::path(
    put,
    path = "/{comment_id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    description = "Only the comment's author may edit it.",
    params(
        ("photo_id" = i32, Path, description = "Photo ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Photo or comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((photo_id, comment_id)): AppPath<(i32, i32)>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let message = validate_comment_request(&payload)?;
    require_photo(&state.db, photo_id).await?;
    ownership::authorize(&state.db, ResourceKind::Comment, comment_id, auth_user.user_id).await?;
    let existing = find_comment(&state.db, photo_id, comment_id).await?;

    let mut active = existing.into_active_model();
    active.message = Set(message);
    active.updated_at = Set(Utc::now());
    let comment = active.update(&state.db).await?;

    Ok(Json(CommentResponse::from(comment)))
}

#[utoipa::path(
    delete,
    path = "/{comment_id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "Only the comment's author may delete it.",
    params(
        ("photo_id" = i32, Path, description = "Photo ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 200, description = "Comment deleted", body = DeleteResponse),
        (status = 400, description = "Non-numeric ID (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Photo or comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((photo_id, comment_id)): AppPath<(i32, i32)>,
) -> Result<Json<DeleteResponse>, AppError> {
    require_photo(&state.db, photo_id).await?;
    ownership::authorize(&state.db, ResourceKind::Comment, comment_id, auth_user.user_id).await?;
    let existing = find_comment(&state.db, photo_id, comment_id).await?;

    let mut active = existing.into_active_model();
    let now = Utc::now();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    tracing::info!(comment_id, "Comment deleted");

    Ok(Json(DeleteResponse::new("comment", comment_id)))
}

/// 404 unless the photo exists and is not deleted.
async fn require_photo<C: ConnectionTrait>(db: &C, photo_id: i32) -> Result<(), AppError> {
    ownership::owner_of(db, ResourceKind::Photo, photo_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ResourceKind::Photo.not_found())
}

/// Look up a live comment that belongs to `photo_id`.
async fn find_comment<C: ConnectionTrait>(
    db: &C,
    photo_id: i32,
    comment_id: i32,
) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(comment_id)
        .filter(comment::Column::PhotoId.eq(photo_id))
        .filter(comment::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ResourceKind::Comment.not_found())
}
