use std::fmt;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{comment, photo, social_media};
use crate::error::AppError;

/// The kinds of resource that carry an owning `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Photo,
    Comment,
    SocialMedia,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Photo => "photo",
            ResourceKind::Comment => "comment",
            ResourceKind::SocialMedia => "social media",
        }
    }

    pub fn not_found(self) -> AppError {
        AppError::NotFound(format!("{} not found", capitalize(self.label())))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fetch only the `user_id` column of a live resource.
///
/// Outer `None` means the row is absent or soft-deleted; inner `None` means
/// the row exists but its owner has been removed.
pub async fn owner_of<C: ConnectionTrait>(
    db: &C,
    kind: ResourceKind,
    id: i32,
) -> Result<Option<Option<i32>>, DbErr> {
    match kind {
        ResourceKind::Photo => {
            photo::Entity::find_by_id(id)
                .filter(photo::Column::DeletedAt.is_null())
                .select_only()
                .column(photo::Column::UserId)
                .into_tuple::<Option<i32>>()
                .one(db)
                .await
        }
        ResourceKind::Comment => {
            comment::Entity::find_by_id(id)
                .filter(comment::Column::DeletedAt.is_null())
                .select_only()
                .column(comment::Column::UserId)
                .into_tuple::<Option<i32>>()
                .one(db)
                .await
        }
        ResourceKind::SocialMedia => {
            social_media::Entity::find_by_id(id)
                .filter(social_media::Column::DeletedAt.is_null())
                .select_only()
                .column(social_media::Column::UserId)
                .into_tuple::<Option<i32>>()
                .one(db)
                .await
        }
    }
}

/// Allow the caller to mutate a resource only if they own it.
///
/// Absent or soft-deleted resources are `NotFound`; resources owned by
/// someone else, or by nobody, are `PermissionDenied`.
pub async fn authorize<C: ConnectionTrait>(
    db: &C,
    kind: ResourceKind,
    id: i32,
    caller_id: i32,
) -> Result<(), AppError> {
    match owner_of(db, kind, id).await? {
        None => Err(kind.not_found()),
        Some(owner) if owner == Some(caller_id) => Ok(()),
        Some(owner) => {
            tracing::debug!(%kind, id, caller_id, ?owner, "Ownership check rejected");
            Err(AppError::PermissionDenied)
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
