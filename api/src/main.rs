//! PayVault auth service entry point.

use std::sync::Arc;

use actix_web::{web, HttpServer};
use dotenvy::dotenv;
use jsonwebtoken::Algorithm;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pv_core::services::audit::{AuditService, AuditServiceConfig};
use pv_core::services::auth::AuthService;
use pv_core::services::rotation::{RotationConfig, RotationService};
use pv_core::services::session::{
    SessionCleanupConfig, SessionCleanupService, SessionService, SessionServiceConfig,
};
use pv_core::services::token::{TokenService, TokenServiceConfig};
use pv_infra::database::{
    DatabasePool, MySqlAuditLogRepository, MySqlRefreshTokenRepository, MySqlSessionRepository,
    MySqlUserDirectory,
};
use pv_shared::config::AppConfig;

use pv_api::app;
use pv_api::routes::auth::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Load configuration before logging so the filter can come from it
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    info!("Starting PayVault auth service ({})", config.environment);

    if config.auth.jwt.is_using_default_secret() && config.environment.is_production() {
        panic!("JWT_SECRET must be set in production");
    }

    // Database pool and repositories
    let pool = DatabasePool::new(&config.database)
        .await
        .expect("Failed to create database pool");

    let session_repository = Arc::new(MySqlSessionRepository::new(pool.get_pool().clone()));
    let token_repository = Arc::new(MySqlRefreshTokenRepository::new(pool.get_pool().clone()));
    let audit_repository = Arc::new(MySqlAuditLogRepository::new(pool.get_pool().clone()));
    let user_directory = Arc::new(MySqlUserDirectory::new(pool.get_pool().clone()));

    // Services
    let algorithm = match config.auth.jwt.algorithm.as_str() {
        "HS384" => Algorithm::HS384,
        "HS512" => Algorithm::HS512,
        _ => Algorithm::HS256,
    };
    let token_service = Arc::new(
        TokenService::new(TokenServiceConfig {
            jwt_secret: config.auth.jwt.secret.clone(),
            algorithm,
            access_token_ttl_seconds: config.auth.jwt.access_token_expiry,
            hash_memory_kib: config.auth.secret_hash.memory_kib,
            hash_time_cost: config.auth.secret_hash.time_cost,
            hash_parallelism: config.auth.secret_hash.parallelism,
        })
        .expect("Failed to create token service"),
    );

    let audit_service = Arc::new(AuditService::new(
        audit_repository,
        AuditServiceConfig::default(),
    ));

    let session_service = Arc::new(SessionService::new(
        Arc::clone(&session_repository),
        SessionServiceConfig {
            session_ttl_days: config.auth.session.session_ttl_days,
        },
    ));

    let rotation_service = Arc::new(RotationService::with_audit(
        Arc::clone(&session_repository),
        Arc::clone(&token_repository),
        Arc::clone(&user_directory),
        Arc::clone(&token_service),
        Arc::clone(&audit_service),
        RotationConfig {
            refresh_token_ttl_days: config.auth.session.refresh_token_ttl_days,
            idle_timeout_days: config.auth.session.idle_timeout_days,
        },
    ));

    let auth_service = Arc::new(AuthService::with_audit(
        user_directory,
        session_service,
        rotation_service,
        Arc::clone(&token_service),
        audit_service,
    ));

    // Background session pruner (single instance per process)
    let cleanup_service = Arc::new(SessionCleanupService::new(
        session_repository,
        SessionCleanupConfig {
            interval_seconds: config.auth.session.prune_interval_seconds,
            grace_period_days: config.auth.session.prune_grace_days,
            enabled: true,
        },
    ));
    cleanup_service.start_background_task();

    let app_state = web::Data::new(AppState {
        auth_service,
    });

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    HttpServer::new(move || app::create_app(app_state.clone(), Arc::clone(&token_service)))
        .bind(&bind_address)?
        .run()
        .await
}
