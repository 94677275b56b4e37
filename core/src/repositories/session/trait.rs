//! Session repository trait defining the interface for session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::errors::DomainError;

/// Repository trait for Session entity persistence operations
///
/// A session exclusively owns its refresh token chain, so the revocation
/// operations here are compound: marking the session terminal and deleting
/// its ledger rows must happen in one atomic unit. Implementations back
/// this with a database transaction (or a single lock for in-memory
/// stores); a failure anywhere inside the unit must leave no partial state.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    ///
    /// # Arguments
    /// * `session` - The session entity to store
    ///
    /// # Returns
    /// * `Ok(Session)` - The stored session
    /// * `Err(DomainError)` - Storage failed
    async fn insert(&self, session: Session) -> Result<Session, DomainError>;

    /// Find a session by its ID, regardless of state
    ///
    /// # Returns
    /// * `Ok(Some(Session))` - Session found (possibly revoked or expired)
    /// * `Ok(None)` - No session with that ID
    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Revoke a session and delete its refresh tokens, in one atomic unit
    ///
    /// Idempotent: a session that is already revoked is left untouched and
    /// keeps its original reason.
    ///
    /// # Returns
    /// * `Ok(true)` - Session was active and is now revoked
    /// * `Ok(false)` - Session was already revoked or does not exist
    async fn revoke(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<bool, DomainError>;

    /// Revoke every active session of a user and delete their tokens
    ///
    /// Sessions that are already revoked keep their original reason.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions newly revoked
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> Result<usize, DomainError>;

    /// Record a successful rotation by bumping `last_activity_at` to now
    async fn touch_activity(&self, session_id: Uuid) -> Result<(), DomainError>;

    /// Delete sessions whose hard expiry predates `cutoff`
    ///
    /// Revocation state is deliberately ignored; the pruner's grace window
    /// is measured from expiry alone. Ledger rows fall with their session.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions deleted
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
