use actix_web::{http::header::USER_AGENT, web, HttpRequest, HttpResponse};

use crate::dto::auth::{AuthResponse, LoginRequest};
use crate::handlers::error_handler::handle_domain_error;

use pv_core::repositories::audit::AuditLogRepository;
use pv_core::repositories::session::SessionRepository;
use pv_core::repositories::token::RefreshTokenRepository;
use pv_core::repositories::user::UserDirectory;

use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// Exchanges email/password credentials for an access token and the root
/// refresh token of a new session.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "string",
///     "password": "string"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "opaque_secret",
///     "expires_in": 600
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid credentials
/// - 503 Service Unavailable: Storage failure
pub async fn login<U, S, T, A>(
    req: HttpRequest,
    state: web::Data<AppState<U, S, T, A>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserDirectory + 'static,
    S: SessionRepository + 'static,
    T: RefreshTokenRepository + 'static,
    A: AuditLogRepository + 'static,
{
    let ip_address = req
        .connection_info()
        .realip_remote_addr()
        .map(|ip| ip.to_string());
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    match state
        .auth_service
        .login(&request.email, &request.password, ip_address, user_agent)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(AuthResponse::from(response)),
        Err(error) => handle_domain_error(&error),
    }
}
