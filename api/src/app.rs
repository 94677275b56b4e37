//! Application factory
//!
//! Builds the Actix application with middleware and the route tree.

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpResponse};

use pv_core::repositories::audit::AuditLogRepository;
use pv_core::repositories::session::SessionRepository;
use pv_core::repositories::token::RefreshTokenRepository;
use pv_core::repositories::user::UserDirectory;
use pv_core::services::token::TokenService;

use crate::middleware::auth::JwtAuth;
use crate::routes::auth::{login::login, logout::logout, refresh::refresh, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<U, S, T, A>(
    app_state: web::Data<AppState<U, S, T, A>>,
    token_service: Arc<TokenService>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserDirectory + 'static,
    S: SessionRepository + 'static,
    T: RefreshTokenRepository + 'static,
    A: AuditLogRepository + 'static,
{
    App::new()
        // Add application state
        .app_data(app_state)
        // Request logging
        .wrap(Logger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/login", web::post().to(login::<U, S, T, A>))
                    .route("/refresh", web::post().to(refresh::<U, S, T, A>))
                    .route(
                        "/logout",
                        web::post()
                            .to(logout::<U, S, T, A>)
                            .wrap(JwtAuth::new(token_service)),
                    ),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "payvault-auth",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default handler for unknown routes
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "The requested resource does not exist",
    }))
}
