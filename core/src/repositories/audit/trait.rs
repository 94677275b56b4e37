//! Audit log repository trait defining the interface for audit persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// Repository trait for audit log persistence
///
/// Audit is best-effort: callers go through `AuditService`, which swallows
/// failures so the authentication path is never blocked on this sink.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Persist an audit log entry
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError>;

    /// Find audit logs about a user, newest first
    ///
    /// # Arguments
    /// * `user_id` - The subject user to search for
    /// * `limit` - Maximum number of records to return
    async fn find_by_subject(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError>;
}
