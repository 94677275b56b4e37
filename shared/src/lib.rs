//! Shared configuration types for PayVault server
//!
//! This crate provides the configuration structs used across all server
//! modules, deserializable from files or assembled from the environment.

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, JwtConfig, LoggingConfig,
    SecretHashConfig, ServerConfig, SessionConfig,
};
