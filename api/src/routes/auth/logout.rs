use actix_web::{web, HttpResponse};

use crate::dto::auth::LogoutResponse;
use crate::handlers::error_handler::handle_domain_error;
use crate::middleware::auth::AuthContext;

use pv_core::repositories::audit::AuditLogRepository;
use pv_core::repositories::session::SessionRepository;
use pv_core::repositories::token::RefreshTokenRepository;
use pv_core::repositories::user::UserDirectory;

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the caller's session, identified by the session claim of the
/// verified access token. Idempotent: repeating the call succeeds.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Logged out successfully"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
pub async fn logout<U, S, T, A>(
    state: web::Data<AppState<U, S, T, A>>,
    auth: AuthContext,
) -> HttpResponse
where
    U: UserDirectory + 'static,
    S: SessionRepository + 'static,
    T: RefreshTokenRepository + 'static,
    A: AuditLogRepository + 'static,
{
    match state.auth_service.logout(auth.user_id, auth.session_id).await {
        Ok(()) => HttpResponse::Ok().json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
        Err(error) => handle_domain_error(&error),
    }
}
