//! MySQL implementation of the AuditLogRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pv_core::domain::entities::audit::{AuditEventType, AuditLog};
use pv_core::errors::DomainError;
use pv_core::repositories::audit::AuditLogRepository;

/// MySQL implementation of AuditLogRepository
///
/// Audit rows are append-only; nothing here updates or deletes.
pub struct MySqlAuditLogRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlAuditLogRepository {
    /// Create a new MySQL audit log repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to AuditLog entity
    fn row_to_audit_log(row: &sqlx::mysql::MySqlRow) -> Result<AuditLog, DomainError> {
        let internal = |field: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", field, e),
        };

        let id: String = row.try_get("id").map_err(|e| internal("id", e))?;
        let event_type_str: String = row
            .try_get("event_type")
            .map_err(|e| internal("event_type", e))?;
        let event_type =
            AuditEventType::parse(&event_type_str).ok_or_else(|| DomainError::Internal {
                message: format!("Unknown event type: {}", event_type_str),
            })?;

        let parse_optional_uuid = |value: Option<String>, field: &str| {
            value
                .as_deref()
                .map(|v| {
                    Uuid::parse_str(v).map_err(|e| DomainError::Internal {
                        message: format!("Invalid {} UUID: {}", field, e),
                    })
                })
                .transpose()
        };

        let subject: Option<String> = row
            .try_get("subject_user_id")
            .map_err(|e| internal("subject_user_id", e))?;
        let resource: Option<String> = row
            .try_get("resource_id")
            .map_err(|e| internal("resource_id", e))?;
        let actor: Option<String> = row
            .try_get("actor_user_id")
            .map_err(|e| internal("actor_user_id", e))?;
        let metadata: Option<String> = row.try_get("metadata").map_err(|e| internal("metadata", e))?;

        Ok(AuditLog {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid audit log UUID: {}", e),
            })?,
            event_type,
            subject_user_id: parse_optional_uuid(subject, "subject user")?,
            resource_id: parse_optional_uuid(resource, "resource")?,
            actor_user_id: parse_optional_uuid(actor, "actor user")?,
            ip_address: row
                .try_get("ip_address")
                .map_err(|e| internal("ip_address", e))?,
            user_agent: row
                .try_get("user_agent")
                .map_err(|e| internal("user_agent", e))?,
            metadata: metadata
                .as_deref()
                .map(serde_json::from_str::<JsonValue>)
                .transpose()
                .map_err(|e| DomainError::Internal {
                    message: format!("Invalid audit metadata: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| internal("created_at", e))?,
        })
    }
}

#[async_trait]
impl AuditLogRepository for MySqlAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO audit_logs (
                id, event_type, category, subject_user_id, resource_id,
                actor_user_id, ip_address, user_agent, metadata, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let metadata = audit_log
            .metadata
            .as_ref()
            .map(|m| m.to_string());

        sqlx::query(query)
            .bind(audit_log.id.to_string())
            .bind(audit_log.event_type.as_str())
            .bind(audit_log.event_type.category())
            .bind(audit_log.subject_user_id.map(|id| id.to_string()))
            .bind(audit_log.resource_id.map(|id| id.to_string()))
            .bind(audit_log.actor_user_id.map(|id| id.to_string()))
            .bind(&audit_log.ip_address)
            .bind(&audit_log.user_agent)
            .bind(metadata)
            .bind(audit_log.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Storage {
                message: format!("Failed to insert audit log: {}", e),
            })?;

        Ok(())
    }

    async fn find_by_subject(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        let query = r#"
            SELECT id, event_type, category, subject_user_id, resource_id,
                   actor_user_id, ip_address, user_agent, metadata, created_at
            FROM audit_logs
            WHERE subject_user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .bind(limit as u64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Storage {
                message: format!("Failed to load audit logs: {}", e),
            })?;

        rows.iter().map(Self::row_to_audit_log).collect()
    }
}
