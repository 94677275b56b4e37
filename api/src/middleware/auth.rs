//! Bearer token middleware for authenticated endpoints.
//!
//! Wraps a route, pulls the access token out of the Authorization header,
//! runs it through the token service, and parks an `AuthContext` in the
//! request extensions where handlers pick it up as an extractor.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use pv_core::domain::entities::token::Claims;
use pv_core::errors::{DomainError, TokenError};
use pv_core::services::token::TokenService;

/// Verified caller identity, available to handlers behind the middleware
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject user from the token claims
    pub user_id: Uuid,
    /// Session the access token is bound to
    pub session_id: Uuid,
    /// Role name, if assigned
    pub role: Option<String>,
    /// JWT ID for tracking
    pub jti: String,
}

impl AuthContext {
    /// Builds a context from verified claims
    pub fn from_claims(claims: Claims) -> Result<Self, DomainError> {
        let bad_claims = || DomainError::Token(TokenError::InvalidTokenFormat);
        Ok(Self {
            user_id: claims.user_id().map_err(|_| bad_claims())?,
            session_id: claims.session_id().map_err(|_| bad_claims())?,
            role: claims.role,
            jti: claims.jti,
        })
    }
}

/// JWT authentication middleware factory
pub struct JwtAuth {
    token_service: Arc<TokenService>,
}

impl JwtAuth {
    /// Creates a new JWT authentication middleware
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self { token_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            token_service: Arc::clone(&self.token_service),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    token_service: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let token_service = Arc::clone(&self.token_service);

        Box::pin(async move {
            let Some(token) = bearer_token(&req) else {
                return Err(ErrorUnauthorized("Missing or invalid Authorization header"));
            };

            let claims = token_service
                .verify_access_token(&token)
                .map_err(|_| ErrorUnauthorized("Invalid or expired access token"))?;

            let auth_context = AuthContext::from_claims(claims)
                .map_err(|_| ErrorUnauthorized("Invalid token claims"))?;

            req.extensions_mut().insert(auth_context);

            service.call(req).await
        })
    }
}

/// The token following the `Bearer ` scheme, if the header carries one
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}
