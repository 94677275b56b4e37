//! MySQL implementation of the SessionRepository trait.
//!
//! Revocation is compound: the session row flips to revoked and its ledger
//! rows disappear inside one transaction, so no observer ever sees a
//! revoked session with live refresh tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pv_core::domain::entities::session::{RevocationReason, Session};
use pv_core::errors::DomainError;
use pv_core::repositories::session::SessionRepository;

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    /// Create a new MySQL session repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Session entity
    fn row_to_session(row: &sqlx::mysql::MySqlRow) -> Result<Session, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let user_id: String = row.try_get("user_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get user_id: {}", e),
        })?;
        let reason: Option<String> =
            row.try_get("revocation_reason")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get revocation_reason: {}", e),
                })?;

        Ok(Session {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid session UUID: {}", e),
            })?,
            user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            last_activity_at: row
                .try_get::<DateTime<Utc>, _>("last_activity_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get last_activity_at: {}", e),
                })?,
            revoked: row.try_get("revoked").map_err(|e| DomainError::Internal {
                message: format!("Failed to get revoked: {}", e),
            })?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get revoked_at: {}", e),
                })?,
            revocation_reason: reason.as_deref().and_then(RevocationReason::parse),
            ip_address: row.try_get("ip_address").map_err(|e| DomainError::Internal {
                message: format!("Failed to get ip_address: {}", e),
            })?,
            user_agent: row.try_get("user_agent").map_err(|e| DomainError::Internal {
                message: format!("Failed to get user_agent: {}", e),
            })?,
        })
    }

    fn storage_error(context: &str, e: sqlx::Error) -> DomainError {
        DomainError::Storage {
            message: format!("{}: {}", context, e),
        }
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn insert(&self, session: Session) -> Result<Session, DomainError> {
        let query = r#"
            INSERT INTO sessions (
                id, user_id, created_at, expires_at, last_activity_at,
                revoked, revoked_at, revocation_reason, ip_address, user_agent
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(session.id.to_string())
            .bind(session.user_id.to_string())
            .bind(session.created_at)
            .bind(session.expires_at)
            .bind(session.last_activity_at)
            .bind(session.revoked)
            .bind(session.revoked_at)
            .bind(session.revocation_reason.map(|r| r.as_str()))
            .bind(&session.ip_address)
            .bind(&session.user_agent)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to insert session", e))?;

        Ok(session)
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        let query = r#"
            SELECT id, user_id, created_at, expires_at, last_activity_at,
                   revoked, revoked_at, revocation_reason, ip_address, user_agent
            FROM sessions
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to find session", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::storage_error("Failed to begin transaction", e))?;

        let update = r#"
            UPDATE sessions
            SET revoked = TRUE, revoked_at = ?, revocation_reason = ?
            WHERE id = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(update)
            .bind(Utc::now())
            .bind(reason.as_str())
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::storage_error("Failed to revoke session", e))?;

        sqlx::query("DELETE FROM refresh_tokens WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::storage_error("Failed to delete session tokens", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::storage_error("Failed to commit revocation", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::storage_error("Failed to begin transaction", e))?;

        let update = r#"
            UPDATE sessions
            SET revoked = TRUE, revoked_at = ?, revocation_reason = ?
            WHERE user_id = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(update)
            .bind(Utc::now())
            .bind(reason.as_str())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::storage_error("Failed to revoke user sessions", e))?;

        let delete = r#"
            DELETE FROM refresh_tokens
            WHERE session_id IN (SELECT id FROM sessions WHERE user_id = ?)
        "#;

        sqlx::query(delete)
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::storage_error("Failed to delete user tokens", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::storage_error("Failed to commit revocation", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn touch_activity(&self, session_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("UPDATE sessions SET last_activity_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to touch session activity", e))?;

        Ok(())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        // Ledger rows fall with their session via the FK cascade
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to prune sessions", e))?;

        Ok(result.rows_affected() as usize)
    }
}
