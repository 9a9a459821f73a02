//! # Error Handling
//!
//! Error types for the TaskEase backend, defined with `thiserror`. The
//! authentication subsystem deliberately conflates several failure causes in
//! its public-facing messages (unknown email vs. wrong password, missing vs.
//! expired session); the variants here keep the causes distinct so internal
//! diagnostics stay precise while the API layer flattens them.

use std::fmt;

/// Custom result type for TaskEase operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the TaskEase backend
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Request validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Authentication and authorization errors
    #[error("Authentication error: {message}")]
    Auth { message: String, error_type: AuthErrorType },

    /// Resource conflict errors (uniqueness violations)
    #[error("Resource conflict: {message}")]
    Conflict { message: String, resource_type: String },

    /// Resource not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Downstream notification delivery errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Internal server errors (including data-integrity failures such as a
    /// malformed stored password digest)
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authentication error subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorType {
    InvalidEmail,
    InvalidCredentials,
    MissingSession,
    InvalidSession,
    ExpiredSession,
}

impl fmt::Display for AuthErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorType::InvalidEmail => write!(f, "invalid_email"),
            AuthErrorType::InvalidCredentials => write!(f, "invalid_credentials"),
            AuthErrorType::MissingSession => write!(f, "missing_session"),
            AuthErrorType::InvalidSession => write!(f, "invalid_session"),
            AuthErrorType::ExpiredSession => write!(f, "expired_session"),
        }
    }
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(message: S, error_type: AuthErrorType) -> Self {
        Self::Auth { message: message.into(), error_type }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>, R: Into<String>>(message: S, resource_type: R) -> Self {
        Self::Conflict { message: message.into(), resource_type: resource_type.into() }
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a notification delivery error
    pub fn notification<S: Into<String>>(message: S) -> Self {
        Self::Notification(message.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::validation(errors.to_string())
    }
}
