//! Domain-specific error types for authentication and token operations.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is not active")]
    AccountInactive,

    #[error("Authentication failed")]
    AuthenticationFailed,
}

/// Token-related errors
///
/// `InvalidRefreshToken` is the single error every refresh rejection is
/// collapsed into before it leaves the rotation engine; the internal cause
/// (unknown, reused, revoked, expired, idle) is logged but never exposed.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token already used")]
    TokenAlreadyUsed,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}
