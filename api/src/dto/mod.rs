//! Request and response DTOs for the HTTP layer.

pub mod auth;
pub mod error;

pub use auth::{AuthResponse, LoginRequest, LogoutResponse, RefreshTokenRequest};
pub use error::ErrorResponse;
