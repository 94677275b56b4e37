//! Maps domain errors onto HTTP responses.
//!
//! Every refresh rejection arrives here as the same `InvalidRefreshToken`
//! and leaves as the same 401 body; credential failures and inactive
//! accounts are likewise indistinguishable to the client.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use tracing::error;

use pv_core::errors::{AuthError, DomainError, TokenError};

use crate::dto::ErrorResponse;

/// Convert a domain error into the client-facing HTTP response
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Auth(AuthError::InvalidCredentials)
        | DomainError::Auth(AuthError::AccountInactive)
        | DomainError::Auth(AuthError::AuthenticationFailed) => {
            ErrorResponse::new("INVALID_CREDENTIALS", "Invalid credentials")
                .to_response(StatusCode::UNAUTHORIZED)
        }
        DomainError::Token(TokenError::InvalidRefreshToken) => ErrorResponse::new(
            "INVALID_REFRESH_TOKEN",
            "Invalid or expired refresh token",
        )
        .to_response(StatusCode::UNAUTHORIZED),
        DomainError::Token(_) | DomainError::Unauthorized => {
            ErrorResponse::new("UNAUTHORIZED", "Authentication required")
                .to_response(StatusCode::UNAUTHORIZED)
        }
        DomainError::Validation { message } => {
            ErrorResponse::new("VALIDATION_ERROR", message.clone())
                .to_response(StatusCode::BAD_REQUEST)
        }
        DomainError::NotFound { resource } => {
            ErrorResponse::new("NOT_FOUND", format!("{} not found", resource))
                .to_response(StatusCode::NOT_FOUND)
        }
        DomainError::Storage { message } => {
            error!("Storage failure: {}", message);
            ErrorResponse::new("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
                .to_response(StatusCode::SERVICE_UNAVAILABLE)
        }
        DomainError::Internal { message } => {
            error!("Internal error: {}", message);
            ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
                .to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
