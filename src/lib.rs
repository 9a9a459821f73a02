//! # TaskEase
//!
//! Multi-tenant task-management backend. This crate implements the
//! authentication and session lifecycle subsystem: credential registration,
//! email-verification token issuance and consumption, password hashing,
//! cookie-bound session credentials, and the authorization gate protecting
//! every authenticated request.
//!
//! ## Architecture
//!
//! ```text
//! REST API Layer (axum) → Auth Services → Credential Store (sqlx/SQLite)
//!        ↓                     ↓
//! Authorization Gate      Notifier (lettre)
//! ```
//!
//! The composition root (`main.rs`) builds one pool, one session service, and
//! one notifier, and threads them through [`api::ApiState`]; no component is
//! reachable through a hidden global.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod notifier;
pub mod observability;
pub mod storage;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
