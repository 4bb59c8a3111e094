use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{UserProjection, require_text, validate_url};
use crate::entity::social_media;
use crate::error::AppError;

/// Request body for creating or updating a social media link.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SocialMediaRequest {
    #[schema(example = "Instagram")]
    pub name: String,
    /// Must be unique across all users.
    #[schema(example = "https://instagram.com/alice")]
    pub social_media_url: String,
}

/// Validated `(name, url)` pair, trimmed.
pub fn validate_social_media_request(
    payload: &SocialMediaRequest,
) -> Result<(String, String), AppError> {
    let name = require_text(&payload.name, "name")?;
    if name.chars().count() > 64 {
        return Err(AppError::Validation(
            "name must be at most 64 characters".into(),
        ));
    }
    let url = require_text(&payload.social_media_url, "social media URL")?;
    validate_url(url, "social media URL")?;
    Ok((name.to_string(), url.to_string()))
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SocialMediaResponse {
    #[schema(example = 5)]
    pub id: i32,
    #[schema(example = "Instagram")]
    pub name: String,
    #[schema(example = "https://instagram.com/alice")]
    pub social_media_url: String,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner projection; present on reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProjection>,
}

impl From<social_media::Model> for SocialMediaResponse {
    fn from(model: social_media::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            social_media_url: model.social_media_url,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            user: None,
        }
    }
}

impl SocialMediaResponse {
    pub fn with_owner(mut self, owner: Option<UserProjection>) -> Self {
        self.user = owner;
        self
    }
}
