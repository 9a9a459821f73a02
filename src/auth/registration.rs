//! Registration and email-verification flows.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::user::{NewUser, User};
use crate::auth::validation::{self, RegisterRequest};
use crate::auth::{hashing, verification};
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error, Result};
use crate::notifier::Notifier;
use crate::storage::repositories::UserRepository;

/// Bounded retries for verification-token collisions at insert time. The
/// token space is small enough that collisions happen in practice; each retry
/// draws a fresh token and re-attempts the insert.
const TOKEN_INSERT_ATTEMPTS: usize = 5;

/// Result of a registration attempt. The identity is committed either way;
/// `notified` records whether the verification email went out.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub user: User,
    pub notified: bool,
}

/// Orchestrates credential store, hasher, token issuer, and notifier for
/// account registration and email verification.
#[derive(Clone)]
pub struct RegistrationService {
    user_repository: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
}

impl RegistrationService {
    pub fn new(user_repository: Arc<dyn UserRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { user_repository, notifier }
    }

    /// Register a new identity in the unverified state and send the
    /// verification email.
    ///
    /// Notification failure is non-fatal: the identity row is already
    /// committed, the failure is logged, and `resend_verification` recovers.
    ///
    /// # Errors
    ///
    /// - `InvalidEmail` when the email fails the syntax check
    /// - `Conflict` when the email or username is already registered
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegistrationOutcome> {
        // Validate the normalized form: the same address must pass or fail
        // identically here and at login.
        let email = User::normalize_email(&request.email);
        if !validation::validate_email(&email) {
            return Err(Error::auth("Please enter a valid email", AuthErrorType::InvalidEmail));
        }

        let password_hash = hashing::hash_password(&request.password)?;

        let (user, token) =
            self.insert_with_fresh_token(&request.username, &email, &password_hash).await?;

        let notified = match self
            .notifier
            .send_verification(&user.email, &user.username, &token)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                // Identity is committed; the user can ask for a resend.
                warn!(user_id = %user.id, error = %err, "verification email failed after registration");
                false
            }
        };

        info!(user_id = %user.id, notified, "user registered");
        Ok(RegistrationOutcome { user, notified })
    }

    /// Insert the identity, regenerating the verification token on a
    /// token-column collision. Insert-then-retry, never pre-check-then-insert:
    /// uniqueness stays with the store's constraint.
    async fn insert_with_fresh_token(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(User, String)> {
        let mut attempts = 0;
        loop {
            let token = verification::issue_token();
            let new_user = NewUser {
                id: UserId::new(),
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                verification_token: token.clone(),
            };

            match self.user_repository.create_user(new_user).await {
                Ok(user) => return Ok((user, token)),
                Err(Error::Conflict { resource_type, .. })
                    if resource_type == "verification_token" =>
                {
                    attempts += 1;
                    if attempts >= TOKEN_INSERT_ATTEMPTS {
                        return Err(Error::internal(
                            "Could not issue a unique verification token",
                        ));
                    }
                    warn!(attempts, "verification token collision, regenerating");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Consume a verification token, marking the owning identity verified.
    ///
    /// Single-shot by design: a second call with the same token fails
    /// `NotFound`, and an unknown token is indistinguishable from a consumed
    /// one.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<()> {
        if self.user_repository.consume_verification_token(token).await? {
            info!("email verified");
            Ok(())
        } else {
            Err(Error::not_found("Unknown or already used verification token"))
        }
    }

    /// Re-send the verification email for a still-unverified identity,
    /// reusing its pending token.
    ///
    /// Responds identically whether or not the email is registered (or
    /// already verified), so the endpoint cannot be used to probe for
    /// accounts. Only an actual delivery failure surfaces as an error.
    #[instrument(skip(self, email))]
    pub async fn resend_verification(&self, email: &str) -> Result<()> {
        let email = User::normalize_email(email);

        let record = match self.user_repository.get_auth_record(&email).await? {
            Some(record) if !record.user.is_verified => record,
            _ => {
                info!("resend requested for unknown or verified email");
                return Ok(());
            }
        };

        let token = record
            .verification_token
            .ok_or_else(|| Error::internal("Unverified identity without verification token"))?;

        self.notifier.send_verification(&record.user.email, &record.user.username, &token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::test_support::RecordingNotifier;
    use crate::storage::repositories::SqlxUserRepository;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_service() -> (RegistrationService, Arc<RecordingNotifier>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect("sqlite::memory:")
            .await
            .expect("create sqlite pool");

        crate::storage::run_migrations(&pool).await.expect("run migrations");

        let notifier = Arc::new(RecordingNotifier::default());
        let service =
            RegistrationService::new(Arc::new(SqlxUserRepository::new(pool)), notifier.clone());

        (service, notifier)
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "pw123".to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_unverified_identity_and_notifies() {
        let (service, notifier) = setup_service().await;

        let outcome =
            service.register(&register_request("alice", "alice@x.com")).await.expect("register");

        assert!(!outcome.user.is_verified);
        assert!(outcome.notified);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "alice@x.com");
        assert_eq!(sent[0].token.len(), verification::VERIFICATION_TOKEN_LENGTH);
    }

    #[tokio::test]
    async fn register_normalizes_email() {
        let (service, notifier) = setup_service().await;

        let outcome =
            service.register(&register_request("alice", "Alice@X.COM")).await.expect("register");

        assert_eq!(outcome.user.email, "alice@x.com");
        assert_eq!(notifier.sent()[0].email, "alice@x.com");
    }

    #[tokio::test]
    async fn register_accepts_email_with_surrounding_whitespace() {
        let (service, _notifier) = setup_service().await;

        let outcome = service
            .register(&register_request("alice", "  alice@x.com  "))
            .await
            .expect("padded email must register");

        assert_eq!(outcome.user.email, "alice@x.com");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_before_any_write() {
        let (service, notifier) = setup_service().await;

        let err = service
            .register(&register_request("alice", "not-an-email"))
            .await
            .expect_err("must reject");

        assert!(matches!(
            err,
            Error::Auth { error_type: AuthErrorType::InvalidEmail, .. }
        ));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn concurrent_duplicate_registrations_commit_exactly_one_identity() {
        // In-memory SQLite gives every pooled connection its own database, so
        // the racing tasks must share a single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("create sqlite pool");
        crate::storage::run_migrations(&pool).await.expect("run migrations");

        let service = RegistrationService::new(
            Arc::new(SqlxUserRepository::new(pool)),
            Arc::new(RecordingNotifier::default()),
        );

        let mut jobs = tokio::task::JoinSet::new();
        for i in 0..2 {
            let service = service.clone();
            jobs.spawn(async move {
                service.register(&register_request(&format!("alice{}", i), "alice@x.com")).await
            });
        }

        let mut successes = 0usize;
        let mut conflicts = 0usize;
        while let Some(result) = jobs.join_next().await {
            match result.expect("task panicked") {
                Ok(_) => successes += 1,
                Err(Error::Conflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(successes, 1, "exactly one concurrent registration may win");
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn duplicate_email_fails_conflict() {
        let (service, _notifier) = setup_service().await;

        service.register(&register_request("alice", "alice@x.com")).await.expect("first");
        let err = service
            .register(&register_request("alice2", "alice@x.com"))
            .await
            .expect_err("second must fail");

        assert!(matches!(err, Error::Conflict { .. }));
    }

    #[tokio::test]
    async fn notification_failure_still_commits_the_identity() {
        let (service, notifier) = setup_service().await;
        notifier.fail_next();

        let outcome =
            service.register(&register_request("alice", "alice@x.com")).await.expect("register");
        assert!(!outcome.notified);

        // The account exists and a resend goes through.
        service.resend_verification("alice@x.com").await.expect("resend");
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn verify_email_is_single_shot() {
        let (service, notifier) = setup_service().await;

        service.register(&register_request("alice", "alice@x.com")).await.expect("register");
        let token = notifier.sent()[0].token.clone();

        service.verify_email(&token).await.expect("first verify");
        let err = service.verify_email(&token).await.expect_err("second verify must fail");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn verify_unknown_token_fails_not_found() {
        let (service, _notifier) = setup_service().await;
        let err = service.verify_email("NOSUCH").await.expect_err("must fail");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn resend_reuses_the_pending_token() {
        let (service, notifier) = setup_service().await;

        service.register(&register_request("alice", "alice@x.com")).await.expect("register");
        service.resend_verification("alice@x.com").await.expect("resend");

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].token, sent[1].token);
    }

    #[tokio::test]
    async fn resend_for_unknown_email_is_silent() {
        let (service, notifier) = setup_service().await;
        service.resend_verification("ghost@x.com").await.expect("silent ok");
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn resend_after_verification_is_silent() {
        let (service, notifier) = setup_service().await;

        service.register(&register_request("alice", "alice@x.com")).await.expect("register");
        let token = notifier.sent()[0].token.clone();
        service.verify_email(&token).await.expect("verify");

        service.resend_verification("alice@x.com").await.expect("silent ok");
        assert_eq!(notifier.sent().len(), 1);
    }
}
