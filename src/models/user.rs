// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'user', 'admin' or 'moderator'.
    pub role: String,

    pub avatar_url: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The part of a user that other users may see (leaderboards).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            avatar_url: u.avatar_url.clone(),
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50, message = "Name length must be between 2 and 50 characters."))]
    pub name: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for Admin creating a user (can specify role).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(custom(function = validate_role))]
    pub role: String,
    #[validate(custom(function = validate_avatar_url))]
    pub avatar_url: Option<String>,
}

/// DTO for updating a user. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    #[validate(length(min = 2, max = 50))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = validate_role))]
    pub role: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    #[validate(custom(function = validate_avatar_url))]
    pub avatar_url: Option<String>,
}

pub fn validate_role(role: &str) -> Result<(), validator::ValidationError> {
    match role {
        "user" | "admin" | "moderator" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_role")),
    }
}

fn validate_avatar_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.len() > 500 || Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_avatar_url"));
    }
    Ok(())
}
