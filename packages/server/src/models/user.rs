use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 characters).
    #[schema(example = "alice")]
    pub username: String,
    /// Unique email address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (at least 6 characters).
    #[schema(example = "secret123")]
    pub password: String,
    /// Age in years (8-99).
    #[schema(example = 27)]
    pub age: i32,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".into()));
    }
    if username.chars().count() > 32 {
        return Err(AppError::Validation(
            "username must be at most 32 characters".into(),
        ));
    }
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation("invalid email format".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }
    if payload.password.chars().count() < 6 {
        return Err(AppError::Validation(
            "password must have a minimum length of 6 characters".into(),
        ));
    }
    if !(8..=99).contains(&payload.age) {
        return Err(AppError::Validation(
            "age must be between 8 and 99".into(),
        ));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "secret123")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

/// Claims of the authenticated caller.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "alice@example.com")]
    pub email: String,
}
