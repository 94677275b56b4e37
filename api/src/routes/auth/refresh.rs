use actix_web::{web, HttpResponse};

use crate::dto::auth::{AuthResponse, RefreshTokenRequest};
use crate::handlers::error_handler::handle_domain_error;

use pv_core::repositories::audit::AuditLogRepository;
use pv_core::repositories::session::SessionRepository;
use pv_core::repositories::token::RefreshTokenRepository;
use pv_core::repositories::user::UserDirectory;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Rotates a refresh token: the presented secret is consumed and a new
/// access/refresh pair is returned.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "string"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "new_opaque_secret",
///     "expires_in": 600
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: one generic body for every rejection, whether the
///   token is unknown, expired, replayed, or its session is gone
/// - 503 Service Unavailable: Storage failure
pub async fn refresh<U, S, T, A>(
    state: web::Data<AppState<U, S, T, A>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    U: UserDirectory + 'static,
    S: SessionRepository + 'static,
    T: RefreshTokenRepository + 'static,
    A: AuditLogRepository + 'static,
{
    match state.auth_service.refresh(&request.refresh_token).await {
        Ok(response) => HttpResponse::Ok().json(AuthResponse::from(response)),
        Err(error) => handle_domain_error(&error),
    }
}
