//! Login, logout, and password-change orchestration.
//!
//! Thin by design: credential checking belongs to the user directory, the
//! session store owns lifecycle, and the rotation engine owns the ledger.
//! This service only sequences them and records the audit trail.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::entities::session::RevocationReason;
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::audit::{AuditLogRepository, NoOpAuditLogRepository};
use crate::repositories::session::SessionRepository;
use crate::repositories::token::RefreshTokenRepository;
use crate::repositories::user::UserDirectory;
use crate::services::audit::AuditService;
use crate::services::rotation::RotationService;
use crate::services::session::SessionService;
use crate::services::token::TokenService;

/// Authentication service for the login/refresh/logout flow
pub struct AuthService<U, S, T, A = NoOpAuditLogRepository>
where
    U: UserDirectory,
    S: SessionRepository,
    T: RefreshTokenRepository,
    A: AuditLogRepository + 'static,
{
    /// External account directory
    users: Arc<U>,
    /// Session lifecycle service
    session_service: Arc<SessionService<S>>,
    /// Refresh token rotation engine
    rotation_service: Arc<RotationService<S, T, U, A>>,
    /// Access token issuer
    token_service: Arc<TokenService>,
    /// Optional audit sink
    audit_service: Option<Arc<AuditService<A>>>,
}

impl<U, S, T, A> AuthService<U, S, T, A>
where
    U: UserDirectory,
    S: SessionRepository,
    T: RefreshTokenRepository,
    A: AuditLogRepository + 'static,
{
    /// Create a new authentication service
    pub fn new(
        users: Arc<U>,
        session_service: Arc<SessionService<S>>,
        rotation_service: Arc<RotationService<S, T, U, A>>,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            session_service,
            rotation_service,
            token_service,
            audit_service: None,
        }
    }

    /// Create a new authentication service with audit logging
    pub fn with_audit(
        users: Arc<U>,
        session_service: Arc<SessionService<S>>,
        rotation_service: Arc<RotationService<S, T, U, A>>,
        token_service: Arc<TokenService>,
        audit_service: Arc<AuditService<A>>,
    ) -> Self {
        Self {
            users,
            session_service,
            rotation_service,
            token_service,
            audit_service: Some(audit_service),
        }
    }

    /// Exchange credentials for a new session and token pair
    ///
    /// On credential failure nothing is written: no session row, no ledger
    /// entry. Inactive accounts fail after the password check so that the
    /// two cases are the same 401 at the boundary.
    ///
    /// # Arguments
    ///
    /// * `email` - Login email
    /// * `password` - Login password
    /// * `ip_address` - Client IP, stored on the session for audit
    /// * `user_agent` - Client user agent, stored on the session for audit
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - Access token plus root refresh secret
    /// * `Err(DomainError)` - Credentials rejected or storage failed
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> DomainResult<AuthResponse> {
        let user = match self.users.verify_credentials(email, password).await? {
            Some(user) => user,
            None => {
                if let Some(audit) = &self.audit_service {
                    audit
                        .log_login_failure(email, ip_address, user_agent)
                        .await;
                }
                return Err(DomainError::Auth(AuthError::InvalidCredentials));
            }
        };

        if !user.active {
            if let Some(audit) = &self.audit_service {
                audit
                    .log_login_failure(email, ip_address, user_agent)
                    .await;
            }
            return Err(DomainError::Auth(AuthError::AccountInactive));
        }

        let session = self
            .session_service
            .create_session(user.id, ip_address.clone(), user_agent.clone())
            .await?;

        let refresh_token = self.rotation_service.issue_root_token(&session).await?;
        let access_token =
            self.token_service
                .issue_access_token(user.id, session.id, user.role.clone())?;

        info!(user_id = %user.id, session_id = %session.id, "Login succeeded");
        if let Some(audit) = &self.audit_service {
            audit
                .log_login_success(user.id, session.id, ip_address, user_agent)
                .await;
        }

        Ok(AuthResponse::new(
            access_token,
            refresh_token,
            self.token_service.access_token_ttl_seconds(),
        ))
    }

    /// Exchange a refresh token for a new pair
    ///
    /// All rejection causes surface as the same generic error; see the
    /// rotation engine for the classification.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        let rotated = self.rotation_service.rotate(refresh_token).await?;
        Ok(AuthResponse::from_token_pair(rotated.token_pair))
    }

    /// End the caller's session
    ///
    /// Idempotent: logging out an already-revoked or unknown session is a
    /// success.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The caller, from the verified access token
    /// * `session_id` - The session bound in the access token
    pub async fn logout(&self, user_id: Uuid, session_id: Uuid) -> DomainResult<()> {
        self.session_service
            .revoke(session_id, RevocationReason::UserLogout)
            .await?;

        if let Some(audit) = &self.audit_service {
            audit.log_logout(user_id, session_id).await;
        }

        Ok(())
    }

    /// Revoke every session of a user
    ///
    /// Called after a password change (every other device must
    /// re-authenticate) or by an administrative sweep.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of sessions newly revoked
    pub async fn revoke_all_sessions(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> DomainResult<usize> {
        let count = self
            .session_service
            .revoke_all_for_user(user_id, reason)
            .await?;

        if let Some(audit) = &self.audit_service {
            audit
                .log_sessions_revoked_for_user(user_id, reason, count)
                .await;
        }

        Ok(count)
    }
}
