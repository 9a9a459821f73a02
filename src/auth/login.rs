//! Login flow: email/password authentication producing a session credential.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::hashing;
use crate::auth::session::SessionService;
use crate::auth::user::User;
use crate::auth::validation::LoginRequest;
use crate::errors::{AuthErrorType, Error, Result};
use crate::notifier::Notifier;
use crate::storage::repositories::UserRepository;

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When a non-existent email is used, we still run Argon2 verification against
/// this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// The single user-visible message for every credential failure. Unknown
/// email and wrong password must not be distinguishable.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Outcome of a login attempt that did not fail outright.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Credentials verified; a session credential was minted for the cookie.
    Success { user: User, session_token: String },
    /// Credentials verified but the email is still unverified; the
    /// verification email was re-sent and no session was minted.
    PendingVerification,
}

/// Service for handling email/password authentication.
#[derive(Clone)]
pub struct LoginService {
    user_repository: Arc<dyn UserRepository>,
    session_service: Arc<SessionService>,
    notifier: Arc<dyn Notifier>,
}

impl LoginService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        session_service: Arc<SessionService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { user_repository, session_service, notifier }
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for unknown email and for wrong password, with
    /// identical messages; the causes are distinguished only in tracing.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome> {
        let email = User::normalize_email(&request.email);

        let record = match self.user_repository.get_auth_record(&email).await? {
            Some(record) => record,
            None => {
                // Prevent timing-based user enumeration: perform dummy hash
                // verification so response time matches real verification.
                if let Err(e) = hashing::verify_password(&request.password, &DUMMY_HASH) {
                    warn!(error = %e, "dummy hash verification failed unexpectedly");
                }
                warn!("login attempt for non-existent user");
                return Err(Error::auth(INVALID_CREDENTIALS, AuthErrorType::InvalidCredentials));
            }
        };

        if !hashing::verify_password(&request.password, &record.password_hash)? {
            warn!(user_id = %record.user.id, "login attempt with incorrect password");
            return Err(Error::auth(INVALID_CREDENTIALS, AuthErrorType::InvalidCredentials));
        }

        if !record.user.is_verified {
            let token = record.verification_token.ok_or_else(|| {
                Error::internal("Unverified identity without verification token")
            })?;

            // Reference behavior: re-send the existing token rather than
            // reissuing. Delivery failure does not change the outcome.
            if let Err(err) = self
                .notifier
                .send_verification(&record.user.email, &record.user.username, &token)
                .await
            {
                warn!(user_id = %record.user.id, error = %err, "verification re-send failed");
            }

            info!(user_id = %record.user.id, "login deferred pending email verification");
            return Ok(LoginOutcome::PendingVerification);
        }

        let session_token = self.session_service.mint(&record.user.email)?;
        info!(user_id = %record.user.id, "user logged in successfully");

        Ok(LoginOutcome::Success { user: record.user, session_token })
    }
}
