//! HTTP error responses for the API layer.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::{AuthErrorType, Error};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        ApiError::Unauthorized(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { message, .. } => ApiError::BadRequest(message),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict { message, .. } => ApiError::Conflict(message),
            Error::Auth { message, error_type } => match error_type {
                // Reference behavior: a malformed registration email is a 401.
                AuthErrorType::InvalidEmail | AuthErrorType::InvalidCredentials => {
                    ApiError::Unauthorized(message)
                }
                AuthErrorType::MissingSession
                | AuthErrorType::InvalidSession
                | AuthErrorType::ExpiredSession => ApiError::Unauthorized(message),
            },
            Error::Notification(msg) => {
                tracing::error!(error = %msg, "notification delivery failed");
                ApiError::Internal("Failed to send verification email".to_string())
            }
            // Data-integrity and infrastructure failures: log the detail,
            // surface a generic message.
            Error::Database { source, context } => {
                tracing::error!(error = %source, context = %context, "database failure");
                ApiError::Internal(context)
            }
            Error::Config(msg) | Error::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
                ApiError::Internal("Internal server error".to_string())
            }
            Error::Io(err) => {
                tracing::error!(error = %err, "i/o failure");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}
