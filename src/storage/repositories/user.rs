//! User repository: the credential store for identity records.
//!
//! All uniqueness invariants (email, username, pending verification token)
//! live in the schema's UNIQUE constraints; this module maps constraint
//! violations onto [`Error::Conflict`] so callers can distinguish a duplicate
//! identity from a verification-token collision worth retrying.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

use crate::auth::user::{AuthRecord, NewUser, User};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId::from_string(self.id),
            username: self.username,
            email: self.email,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn into_auth_record(self) -> AuthRecord {
        let password_hash = self.password_hash.clone();
        let verification_token = self.verification_token.clone();
        AuthRecord { user: self.into_user(), password_hash, verification_token }
    }
}

/// Credential store contract. Services depend on this trait so storage can be
/// swapped (or faked) without touching flow logic.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new unverified identity. Fails with `Conflict` when email,
    /// username, or verification token collide with an existing row.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Get a user by ID.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by (normalized) email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Login-path lookup: user plus password hash and pending token.
    async fn get_auth_record(&self, email: &str) -> Result<Option<AuthRecord>>;

    /// Atomically consume a verification token: clears it and marks the
    /// owning identity verified in a single UPDATE. Returns `false` when the
    /// token is unknown or already consumed; with two concurrent calls on the
    /// same token exactly one observes `true`.
    async fn consume_verification_token(&self, token: &str) -> Result<bool>;
}

/// SQLite-backed credential store.
#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_insert_error(err: sqlx::Error) -> Error {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                if db_err.message().contains("verification_token") {
                    return Error::conflict(
                        "Verification token collision",
                        "verification_token",
                    );
                }
                return Error::conflict("User already exists", "user");
            }
        }
        Error::Database { source: err, context: "Failed to create user".to_string() }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_verified, verification_token, created_at, updated_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_verified, verification_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6, $7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.verification_token)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Self::map_insert_error)?;

        self.get_user(&user.id)
            .await?
            .ok_or_else(|| Error::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_get_user")]
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user".to_string(),
        })?;

        Ok(row.map(UserRow::into_user))
    }

    #[instrument(skip(self, email), name = "db_get_user_by_email")]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user by email".to_string(),
        })?;

        Ok(row.map(UserRow::into_user))
    }

    #[instrument(skip(self, email), name = "db_get_auth_record")]
    async fn get_auth_record(&self, email: &str) -> Result<Option<AuthRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch credentials".to_string(),
        })?;

        Ok(row.map(UserRow::into_auth_record))
    }

    #[instrument(skip(self, token), name = "db_consume_verification_token")]
    async fn consume_verification_token(&self, token: &str) -> Result<bool> {
        // Single compare-and-clear statement: the lookup and the mutation
        // cannot be split by a concurrent consumer.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verification_token = NULL, is_verified = 1, updated_at = $1
            WHERE verification_token = $2
            "#,
        )
        .bind(Utc::now())
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to consume verification token".to_string(),
        })?;

        Ok(result.rows_affected() == 1)
    }
}
