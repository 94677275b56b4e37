//! Recording mock of AuditLogRepository for testing

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use super::AuditLogRepository;
use crate::domain::entities::audit::{AuditEventType, AuditLog};
use crate::errors::DomainError;

/// Mock audit repository that records every entry in memory
pub struct MockAuditLogRepository {
    entries: Mutex<Vec<AuditLog>>,
}

impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// All recorded entries, in insertion order
    pub fn entries(&self) -> Vec<AuditLog> {
        self.entries.lock().unwrap().clone()
    }

    /// Count of recorded entries with a given event type
    pub fn count_of(&self, event_type: AuditEventType) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl Default for MockAuditLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        self.entries.lock().unwrap().push(audit_log.clone());
        Ok(())
    }

    async fn find_by_subject(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.subject_user_id == Some(user_id))
            .take(limit)
            .cloned()
            .collect())
    }
}
