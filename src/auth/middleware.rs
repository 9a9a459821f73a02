//! Axum middleware for the authorization gate.
//!
//! Recovers identity from the session cookie on every protected request.
//! Missing, invalid, and expired credentials all surface the same 401 message
//! so callers cannot probe which case they hit; the cause stays visible in
//! tracing.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::api::error::ApiError;
use crate::auth::session::{SessionError, SessionService, SESSION_COOKIE_NAME};
use crate::errors::{AuthErrorType, Error};

pub type SessionState = Arc<SessionService>;

/// Request extension inserted by the gate for downstream handlers.
///
/// Carries only the resolved subject email; handlers that need the full
/// identity record re-resolve it from the credential store.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
}

fn unauthenticated(error_type: AuthErrorType) -> ApiError {
    Error::auth("Unauthorized: missing or invalid session", error_type).into()
}

/// Middleware entry point that authenticates requests from the session cookie.
pub async fn authenticate(
    State(session_service): State<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // CORS preflight never carries credentials.
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let path = request.uri().path().to_string();

    let jar = CookieJar::from_headers(request.headers());
    let credential = match jar.get(SESSION_COOKIE_NAME) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            warn!(http.path = %path, reason = "missing", "session cookie rejected");
            return Err(unauthenticated(AuthErrorType::MissingSession));
        }
    };

    match session_service.validate(&credential) {
        Ok(subject) => {
            request.extensions_mut().insert(AuthenticatedUser { email: subject });
            Ok(next.run(request).await)
        }
        Err(SessionError::Expired) => {
            warn!(http.path = %path, reason = "expired", "session cookie rejected");
            Err(unauthenticated(AuthErrorType::ExpiredSession))
        }
        Err(SessionError::Invalid) => {
            warn!(http.path = %path, reason = "invalid", "session cookie rejected");
            Err(unauthenticated(AuthErrorType::InvalidSession))
        }
    }
}
