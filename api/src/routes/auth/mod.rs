//! Authentication route handlers
//!
//! This module contains the authentication endpoints:
//! - Login (credentials to token pair)
//! - Token refresh (rotation)
//! - Logout

pub mod login;
pub mod logout;
pub mod refresh;

use std::sync::Arc;

use pv_core::repositories::audit::AuditLogRepository;
use pv_core::repositories::session::SessionRepository;
use pv_core::repositories::token::RefreshTokenRepository;
use pv_core::repositories::user::UserDirectory;
use pv_core::services::auth::AuthService;

/// Shared application state for the auth routes
pub struct AppState<U, S, T, A>
where
    U: UserDirectory,
    S: SessionRepository,
    T: RefreshTokenRepository,
    A: AuditLogRepository + 'static,
{
    /// Authentication orchestration service
    pub auth_service: Arc<AuthService<U, S, T, A>>,
}
