//! Request DTOs for the devlink API.

use serde::Deserialize;
use validator::Validate;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Password (length checked separately against the hashing rules).
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 80, message = "must be between 1 and 80 characters"))]
    pub name: String,
}
