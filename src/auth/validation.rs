//! Validation helpers and request DTOs for the authentication endpoints.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

lazy_static! {
    // Local part, '@', domain with at least one dot. Matches the syntax the
    // verification emails are sent against; anything stricter belongs to the
    // mail transport.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$")
        .expect("EMAIL_REGEX should be a valid regex pattern");
}

/// Check email syntax against the registration pattern.
pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

/// Email verification request body. The token shape is deliberately not
/// validated here: an ill-formed token is simply one that was never issued,
/// and the verify flow reports it as not found like any other unknown token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Resend-verification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResendVerificationRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
}
