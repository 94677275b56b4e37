//! Session store service: creation, lookup, and revocation of logical logins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::errors::DomainResult;
use crate::repositories::session::SessionRepository;

use super::config::SessionServiceConfig;

/// Service for managing session lifecycle
pub struct SessionService<S: SessionRepository> {
    repository: Arc<S>,
    config: SessionServiceConfig,
}

impl<S: SessionRepository> SessionService<S> {
    /// Create a new session service
    pub fn new(repository: Arc<S>, config: SessionServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Create and persist a session for a fresh login
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user
    /// * `ip_address` - Client IP, stored opaquely for audit
    /// * `user_agent` - Client user agent, stored opaquely for audit
    pub async fn create_session(
        &self,
        user_id: Uuid,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> DomainResult<Session> {
        let session = Session::with_ttl(
            user_id,
            ip_address,
            user_agent,
            self.config.session_ttl(),
        );

        debug!(session_id = %session.id, user_id = %user_id, "Creating session");
        self.repository.insert(session).await
    }

    /// Fetch a session, treating revoked ones as absent
    ///
    /// Callers that only care about usability never see terminal sessions.
    pub async fn get_active(&self, session_id: Uuid) -> DomainResult<Option<Session>> {
        let session = self.repository.find_by_id(session_id).await?;
        Ok(session.filter(|s| !s.revoked))
    }

    /// Revoke a session and delete its refresh tokens
    ///
    /// Idempotent: revoking a session that is already revoked, or that does
    /// not exist, succeeds without changing anything.
    pub async fn revoke(&self, session_id: Uuid, reason: RevocationReason) -> DomainResult<()> {
        let newly_revoked = self.repository.revoke(session_id, reason).await?;
        if newly_revoked {
            info!(session_id = %session_id, reason = %reason, "Session revoked");
        }
        Ok(())
    }

    /// Revoke every active session of a user
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of sessions newly revoked
    pub async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> DomainResult<usize> {
        let count = self.repository.revoke_all_for_user(user_id, reason).await?;
        if count > 0 {
            info!(user_id = %user_id, count, reason = %reason, "Revoked all user sessions");
        }
        Ok(count)
    }

    /// Record a successful rotation on the session
    pub async fn touch_activity(&self, session_id: Uuid) -> DomainResult<()> {
        self.repository.touch_activity(session_id).await
    }

    /// Delete sessions expired before `cutoff`
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of sessions deleted
    pub async fn prune_expired(&self, cutoff: DateTime<Utc>) -> DomainResult<usize> {
        self.repository.delete_expired_before(cutoff).await
    }
}
