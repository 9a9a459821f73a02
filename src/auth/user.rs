//! User domain models and data structures.
//!
//! Defines the core identity record for registered users along with the
//! payloads used when creating one. The serialized [`User`] never carries the
//! password hash or the pending verification token; those travel only through
//! [`NewUser`] and [`AuthRecord`], which stay inside the auth subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserId;

/// Stored representation of a registered user identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Normalize email to lowercase for consistent storage and comparison.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

/// New user creation payload. Carries the already-hashed password and the
/// freshly issued verification token; both land in the store and never in a
/// response body.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
}

/// Login-path lookup result: the identity plus the secrets the login flow
/// needs to verify credentials and re-send a pending verification email.
#[derive(Debug, Clone)]
pub struct AuthRecord {
    pub user: User,
    pub password_hash: String,
    pub verification_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(User::normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn normalize_email_is_idempotent() {
        let once = User::normalize_email("Bob@x.Co");
        assert_eq!(User::normalize_email(&once), once);
    }
}
