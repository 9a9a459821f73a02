//! # Configuration Settings
//!
//! Environment-driven configuration for the TaskEase backend. Every section
//! has sane development defaults; production deployments override them with
//! `TASKEASE_*` environment variables (plus the conventional `DATABASE_URL`).

use std::time::Duration;

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::errors::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Notifier (outbound email) configuration
    pub notifier: NotifierConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            notifier: NotifierConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }

        if self.auth.session_secret.len() < 32 {
            return Err(Error::validation(
                "Session secret must be at least 32 characters long",
            ));
        }

        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be non-zero"))]
    pub port: u16,

    /// CORS allowed origins (empty = CORS disabled)
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("TASKEASE_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: env_or("TASKEASE_HOST", "127.0.0.1"),
            port: env_parse_or("TASKEASE_PORT", 8080),
            cors_origins,
        }
    }

    /// Socket address string for the listener bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080, cors_origins: Vec::new() }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum pool connections
    #[validate(range(min = 1, message = "Max connections must be at least 1"))]
    pub max_connections: u32,

    /// Minimum pool connections
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Idle connection timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Run embedded migrations at startup
    pub auto_migrate: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or("DATABASE_URL", "sqlite://taskease.db"),
            max_connections: env_parse_or("TASKEASE_DB_MAX_CONNECTIONS", 10),
            min_connections: env_parse_or("TASKEASE_DB_MIN_CONNECTIONS", 1),
            connect_timeout_seconds: env_parse_or("TASKEASE_DB_CONNECT_TIMEOUT", 30),
            idle_timeout_seconds: env_parse_or("TASKEASE_DB_IDLE_TIMEOUT", 600),
            auto_migrate: env_parse_or("TASKEASE_DB_AUTO_MIGRATE", true),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://taskease.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Process-wide session signing secret. Must stay stable across the
    /// process lifetime; regenerating it invalidates every outstanding
    /// session.
    pub session_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let session_secret = match std::env::var("TASKEASE_SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!(
                    "TASKEASE_SESSION_SECRET is not set; generated an ephemeral secret. \
                     All sessions will be invalidated on restart."
                );
                rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect()
            }
        };
        Self { session_secret }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Notifier (outbound email) configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifierConfig {
    /// SMTP relay host (empty = log-only notifier)
    pub smtp_host: String,
    /// SMTP submission port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// Sender address for verification email
    pub sender: String,
    /// Frontend URL embedded in verification links
    pub app_url: String,
}

impl NotifierConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env_or("TASKEASE_SMTP_HOST", ""),
            smtp_port: env_parse_or("TASKEASE_SMTP_PORT", 587),
            smtp_username: env_or("TASKEASE_SMTP_USERNAME", ""),
            smtp_password: env_or("TASKEASE_SMTP_PASSWORD", ""),
            sender: env_or("TASKEASE_SENDER_EMAIL", "no-reply@taskease.local"),
            app_url: env_or("TASKEASE_APP_URL", "http://localhost:3000/verify-email"),
        }
    }

    /// Whether a real SMTP relay is configured.
    pub fn smtp_configured(&self) -> bool {
        !self.smtp_host.is_empty()
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
    /// Emit logs as JSON
    pub json_logs: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("TASKEASE_LOG_LEVEL", "info"),
            json_logs: env_parse_or("TASKEASE_LOG_JSON", false),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = AppConfig {
            auth: AuthConfig { session_secret: "x".repeat(64) },
            ..AppConfig::default()
        };
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn short_session_secret_is_rejected() {
        let config = AppConfig {
            auth: AuthConfig { session_secret: "too-short".to_string() },
            ..AppConfig::default()
        };
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn non_sqlite_url_is_rejected() {
        let config = AppConfig {
            auth: AuthConfig { session_secret: "x".repeat(64) },
            database: DatabaseConfig {
                url: "postgresql://localhost/taskease".to_string(),
                ..DatabaseConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn idle_timeout_zero_means_none() {
        let config =
            DatabaseConfig { idle_timeout_seconds: 0, ..DatabaseConfig::default() };
        assert!(config.idle_timeout().is_none());
    }
}
