use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::database::is_unique_violation;
use crate::entity::social_media;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::shared::DeleteResponse;
use crate::models::social_media::{
    SocialMediaRequest, SocialMediaResponse, validate_social_media_request,
};
use crate::state::AppState;
use crate::utils::owner::{load_owner, load_owners};
use crate::utils::ownership::{self, ResourceKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Social Medias",
    operation_id = "listSocialMedias",
    summary = "List all social media links",
    responses(
        (status = 200, description = "Links with their owners", body = Vec<SocialMediaResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_social_medias(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialMediaResponse>>, AppError> {
    let links = social_media::Entity::find()
        .filter(social_media::Column::DeletedAt.is_null())
        .order_by_asc(social_media::Column::Id)
        .all(&state.db)
        .await?;

    let owners = load_owners(&state.db, links.iter().map(|s| s.user_id)).await?;

    Ok(Json(
        links
            .into_iter()
            .map(|s| {
                let owner = s.user_id.and_then(|id| owners.get(&id).cloned());
                SocialMediaResponse::from(s).with_owner(owner)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{social_media_id}",
    tag = "Social Medias",
    operation_id = "getSocialMedia",
    summary = "Get a social media link by ID",
    params(("social_media_id" = i32, Path, description = "Social media ID")),
    responses(
        (status = 200, description = "Link with its owner", body = SocialMediaResponse),
        (status = 400, description = "Non-numeric ID (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Social media not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_social_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(social_media_id): AppPath<i32>,
) -> Result<Json<SocialMediaResponse>, AppError> {
    let link = find_social_media(&state.db, social_media_id).await?;
    let owner = load_owner(&state.db, link.user_id).await?;
    Ok(Json(SocialMediaResponse::from(link).with_owner(owner)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Social Medias",
    operation_id = "createSocialMedia",
    summary = "Add a social media link",
    request_body = SocialMediaRequest,
    responses(
        (status = 201, description = "Link created", body = SocialMediaResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "URL already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_social_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SocialMediaRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (name, url) = validate_social_media_request(&payload)?;

    let now = Utc::now();
    let model = social_media::ActiveModel {
        name: Set(name),
        social_media_url: Set(url),
        user_id: Set(Some(auth_user.user_id)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    let link = model.insert(&state.db).await.map_err(url_conflict)?;

    Ok((StatusCode::CREATED, Json(SocialMediaResponse::from(link))))
}

#[utoipa::path(
    put,
    path = "/{social_media_id}",
    tag = "Social Medias",
    operation_id = "updateSocialMedia",
    summary = "Edit a social media link",
    description = "Only the link's owner may edit it.",
    params(("social_media_id" = i32, Path, description = "Social media ID")),
    request_body = SocialMediaRequest,
    responses(
        (status = 200, description = "Link updated", body = SocialMediaResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Social media not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "URL already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_social_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(social_media_id): AppPath<i32>,
    AppJson(payload): AppJson<SocialMediaRequest>,
) -> Result<Json<SocialMediaResponse>, AppError> {
    let (name, url) = validate_social_media_request(&payload)?;
    ownership::authorize(
        &state.db,
        ResourceKind::SocialMedia,
        social_media_id,
        auth_user.user_id,
    )
    .await?;
    let existing = find_social_media(&state.db, social_media_id).await?;

    let mut active = existing.into_active_model();
    active.name = Set(name);
    active.social_media_url = Set(url);
    active.updated_at = Set(Utc::now());
    let link = active.update(&state.db).await.map_err(url_conflict)?;

    Ok(Json(SocialMediaResponse::from(link)))
}

#[utoipa::path(
    delete,
    path = "/{social_media_id}",
    tag = "Social Medias",
    operation_id = "deleteSocialMedia",
    summary = "Delete a social media link",
    description = "Only the link's owner may delete it.",
    params(("social_media_id" = i32, Path, description = "Social media ID")),
    responses(
        (status = 200, description = "Link deleted", body = DeleteResponse),
        (status = 400, description = "Non-numeric ID (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Social media not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_social_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(social_media_id): AppPath<i32>,
) -> Result<Json<DeleteResponse>, AppError> {
    ownership::authorize(
        &state.db,
        ResourceKind::SocialMedia,
        social_media_id,
        auth_user.user_id,
    )
    .await?;
    let existing = find_social_media(&state.db, social_media_id).await?;

    let mut active = existing.into_active_model();
    let now = Utc::now();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    tracing::info!(social_media_id, "Social media deleted");

    Ok(Json(DeleteResponse::new("social media", social_media_id)))
}

async fn find_social_media<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<social_media::Model, AppError> {
    social_media::Entity::find_by_id(id)
        .filter(social_media::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ResourceKind::SocialMedia.not_found())
}

fn url_conflict(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("social media URL is already registered".into())
    } else {
        AppError::from(err)
    }
}
