use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::user;
use crate::error::AppError;

/// Public projection of a resource owner. Never carries the password hash.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserProjection {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = 27)]
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserProjection {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Confirmation returned by delete endpoints.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "photo with id 3 has been deleted")]
    pub message: String,
}

impl DeleteResponse {
    pub fn new(kind: &str, id: i32) -> Self {
        Self {
            message: format!("{kind} with id {id} has been deleted"),
        }
    }
}

/// Reject a blank required text field. Returns the trimmed value.
pub fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Validate an `http(s)` URL with a non-empty host.
pub fn validate_url(url: &str, field: &str) -> Result<(), AppError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| AppError::Validation(format!("{field} must be an http(s) URL")))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(format!("{field} must be an http(s) URL")));
    }
    Ok(())
}
