use chrono::{DateTime, Utc};
use serde::Serialize;

use super::shared::UserProjection;
use crate::entity::photo;

/// Multipart form accepted by photo create and update (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct PhotoForm {
    #[schema(example = "Sunset")]
    pub title: String,
    #[schema(example = "Taken from the pier")]
    pub caption: String,
    /// Image file (.jpg, .jpeg, .png, .webp). Optional on update.
    #[schema(value_type = String, format = Binary)]
    pub photo: Vec<u8>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PhotoResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Sunset")]
    pub title: String,
    #[schema(example = "Taken from the pier")]
    pub caption: String,
    #[schema(example = "http://127.0.0.1:3000/media/photos/0b9f6c1e-9d1c-4d55-9d57-1f3f2c7a5b10.jpg")]
    pub photo_url: String,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner projection; present on reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProjection>,
}

impl From<photo::Model> for PhotoResponse {
    fn from(model: photo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            caption: model.caption,
            photo_url: model.photo_url,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            user: None,
        }
    }
}

impl PhotoResponse {
    pub fn with_owner(mut self, owner: Option<UserProjection>) -> Self {
        self.user = owner;
        self
    }
}
