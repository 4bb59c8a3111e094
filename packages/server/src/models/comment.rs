use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{UserProjection, require_text};
use crate::entity::comment;
use crate::error::AppError;

/// Request body for creating or updating a comment.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CommentRequest {
    #[schema(example = "Lovely colours!")]
    pub message: String,
}

pub fn validate_comment_request(payload: &CommentRequest) -> Result<String, AppError> {
    Ok(require_text(&payload.message, "message")?.to_string())
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Lovely colours!")]
    pub message: String,
    pub user_id: Option<i32>,
    pub photo_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Author projection; present on reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProjection>,
}

impl From<comment::Model> for CommentResponse {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            message: model.message,
            user_id: model.user_id,
            photo_id: model.photo_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            user: None,
        }
    }
}

impl CommentResponse {
    pub fn with_owner(mut self, owner: Option<UserProjection>) -> Self {
        self.user = owner;
        self
    }
}
