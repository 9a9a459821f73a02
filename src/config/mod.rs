//! Configuration management for the TaskEase backend.

mod settings;

pub use settings::{
    AppConfig, AuthConfig, DatabaseConfig, NotifierConfig, ObservabilityConfig, ServerConfig,
};
