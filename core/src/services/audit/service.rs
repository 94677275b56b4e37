//! Audit service for recording authentication and security events.
//!
//! Writes are best-effort: a failing audit sink is logged and otherwise
//! ignored so it can never block or fail the authentication path.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::audit::{AuditEventType, AuditLog};
use crate::domain::entities::session::RevocationReason;
use crate::repositories::audit::AuditLogRepository;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Whether to run audit writes on a background task
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Service for recording audit events
pub struct AuditService<R>
where
    R: AuditLogRepository,
{
    repository: Arc<R>,
    config: AuditServiceConfig,
}

impl<R> AuditService<R>
where
    R: AuditLogRepository + 'static,
{
    /// Create a new audit service
    pub fn new(repository: Arc<R>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Record an entry, swallowing sink failures
    pub async fn record(&self, audit_log: AuditLog) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            tokio::spawn(async move {
                if let Err(e) = repository.create(&audit_log).await {
                    warn!("Failed to write audit log: {}", e);
                }
            });
        } else if let Err(e) = self.repository.create(&audit_log).await {
            warn!("Failed to write audit log: {}", e);
        }
    }

    /// Log a successful login
    pub async fn log_login_success(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) {
        self.record(
            AuditLog::new(AuditEventType::LoginSuccess)
                .with_subject(user_id)
                .with_resource(session_id)
                .with_request_context(ip_address, user_agent),
        )
        .await;
    }

    /// Log a failed login attempt
    pub async fn log_login_failure(
        &self,
        email: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) {
        self.record(
            AuditLog::new(AuditEventType::LoginFailure)
                .with_request_context(ip_address, user_agent)
                .with_metadata(json!({ "email": mask_email(email) })),
        )
        .await;
    }

    /// Log a successful token rotation
    pub async fn log_token_refreshed(&self, user_id: Uuid, session_id: Uuid) {
        self.record(
            AuditLog::new(AuditEventType::TokenRefreshed)
                .with_subject(user_id)
                .with_resource(session_id),
        )
        .await;
    }

    /// Log a detected refresh token replay
    pub async fn log_reuse_detected(
        &self,
        subject_user_id: Option<Uuid>,
        session_id: Uuid,
        token_family: Uuid,
    ) {
        let mut log = AuditLog::new(AuditEventType::TokenReuseDetected)
            .with_resource(session_id)
            .with_metadata(json!({ "token_family": token_family }));
        if let Some(user_id) = subject_user_id {
            log = log.with_subject(user_id);
        }
        self.record(log).await;
    }

    /// Log a logout
    pub async fn log_logout(&self, user_id: Uuid, session_id: Uuid) {
        self.record(
            AuditLog::new(AuditEventType::Logout)
                .with_subject(user_id)
                .with_resource(session_id),
        )
        .await;
    }

    /// Log a single-session revocation
    pub async fn log_session_revoked(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        reason: RevocationReason,
    ) {
        self.record(
            AuditLog::new(AuditEventType::SessionRevoked)
                .with_subject(user_id)
                .with_resource(session_id)
                .with_metadata(json!({ "reason": reason.as_str() })),
        )
        .await;
    }

    /// Log a user-wide session sweep (password change, admin action)
    pub async fn log_sessions_revoked_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        count: usize,
    ) {
        self.record(
            AuditLog::new(AuditEventType::SessionsRevokedForUser)
                .with_subject(user_id)
                .with_metadata(json!({ "reason": reason.as_str(), "count": count })),
        )
        .await;
    }
}

/// Mask an email for audit storage, keeping one character and the domain
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let head = local.chars().next().unwrap_or('*');
            format!("{}***@{}", head, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
