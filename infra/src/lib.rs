//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the PayVault auth
//! service. It provides the MySQL-backed implementations of the core
//! repository traits and the database connection plumbing.
//!
//! ## Architecture
//!
//! - **Database**: MySQL implementations using SQLx
//!   - Session store with transactional revoke-and-cascade
//!   - Refresh token ledger with the compare-and-swap rotation
//!   - Audit log sink
//!   - User directory (credential verification glue)

pub mod database;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
