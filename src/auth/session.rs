//! Session credential management for cookie-based authentication.
//!
//! Session credentials are stateless HS256 JWTs carrying the subject email,
//! issued-at, and expiry (issued-at + 7 days). Validity is determined purely
//! by signature and expiry; there is no server-side revocation list, so
//! logout only removes the client-side cookie and a regenerated signing
//! secret on restart invalidates every outstanding session. Both are explicit
//! deployment contracts, not bugs.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Session cookie name. Fixed: clients and the logout path must agree on it.
pub const SESSION_COOKIE_NAME: &str = "taskease_token";

/// Session credential validity window in days.
pub const SESSION_TTL_DAYS: i64 = 7;

/// JWT claims carried by a session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's email.
    pub sub: String,
    /// Issued-at time (unix seconds).
    pub iat: i64,
    /// Expiration time (unix seconds).
    pub exp: i64,
}

/// Validation failure kinds for a presented session credential.
///
/// Both map to an unauthenticated result at the API boundary; the distinction
/// exists for internal diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session credential has expired")]
    Expired,
    #[error("session credential is invalid")]
    Invalid,
}

/// Mints and validates signed session credentials.
///
/// Purely computational: no I/O, no locks, safe to share behind an `Arc` and
/// call from any number of concurrent requests.
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionService {
    /// Create a session service signing with the given process-wide secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::default();
        // Expiry is part of the contract under test; no clock slack.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::days(SESSION_TTL_DAYS),
        }
    }

    /// Mint a session credential for the given subject email.
    pub fn mint(&self, subject: &str) -> Result<String> {
        let iat = Utc::now().timestamp();
        let exp = iat + self.ttl.num_seconds();
        self.mint_with_timestamps(subject, iat, exp)
    }

    pub(crate) fn mint_with_timestamps(&self, subject: &str, iat: i64, exp: i64) -> Result<String> {
        let claims = Claims { sub: subject.to_string(), iat, exp };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("Failed to sign session credential: {}", err)))
    }

    /// Validate a presented credential and resolve it to its subject email.
    ///
    /// Signature is checked before expiry; a bad signature or malformed
    /// payload yields [`SessionError::Invalid`], a good signature past its
    /// expiry yields [`SessionError::Expired`].
    pub fn validate(&self, credential: &str) -> std::result::Result<String, SessionError> {
        match decode::<Claims>(credential, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(SessionError::Expired),
                _ => Err(SessionError::Invalid),
            },
        }
    }

    /// Validity window in seconds, for the cookie `Max-Age` attribute.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

/// Build the session cookie carrying a freshly minted credential.
///
/// HttpOnly + Secure + SameSite=None: the cookie is only sent over HTTPS, is
/// invisible to scripts, and works for cross-site frontends.
pub fn session_cookie(credential: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, credential))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .into()
}

/// Build the expired cookie that instructs the client to drop its session.
/// Attributes must match the ones used when the cookie was set.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::ZERO)
        .into()
}
