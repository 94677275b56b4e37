//! Refresh token ledger trait defining the interface for token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository trait for the refresh token ledger
///
/// The ledger is append-mostly: entries are inserted at login and on each
/// rotation, marked used exactly once, and only bulk-deleted when their
/// session is revoked or pruned. Secrets are never stored; entries carry a
/// memory-hard hash plus a non-secret lookup fingerprint.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new ledger entry (family root at login)
    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// All live tips: entries with `used_at` unset and `expires_at > now`
    ///
    /// The caller must verify a presented secret against each candidate's
    /// hash; the salted hash cannot be used as a lookup key.
    async fn find_live(&self, now: DateTime<Utc>) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// All consumed entries (`used_at` set), for the reuse-detection scan
    async fn find_used(&self) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Consume `parent_id` and insert its replacement, in one atomic unit
    ///
    /// The parent's `used_at` is compare-and-swapped from unset to now; if
    /// another rotation got there first the whole operation fails with
    /// `TokenError::TokenAlreadyUsed` and the child is not inserted. This
    /// is what keeps at most one live tip per family under concurrent
    /// rotation attempts.
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The inserted child entry
    /// * `Err(DomainError::Token(TokenAlreadyUsed))` - Lost the race
    async fn rotate(
        &self,
        parent_id: Uuid,
        child: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError>;

    /// Delete every ledger entry belonging to a session
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries deleted
    async fn delete_for_session(&self, session_id: Uuid) -> Result<usize, DomainError>;

    /// All entries of one family, used when investigating a chain
    async fn find_by_family(&self, family: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError>;
}
