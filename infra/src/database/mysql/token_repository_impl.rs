//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! The rotation primitive is a transaction around a guarded UPDATE: the
//! parent's `used_at` only flips if it is still NULL, and the child row is
//! only inserted when the flip succeeded. Two rotations racing on the same
//! parent therefore resolve to exactly one inserted child.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pv_core::domain::entities::token::RefreshTokenRecord;
use pv_core::errors::{DomainError, TokenError};
use pv_core::repositories::token::RefreshTokenRepository;

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, session_id, token_family, parent_token_id, token_hash,
           lookup_fingerprint, created_at, expires_at, used_at
    FROM refresh_tokens
"#;

impl MySqlRefreshTokenRepository {
    /// Create a new MySQL refresh token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let session_id: String = row.try_get("session_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get session_id: {}", e),
        })?;
        let token_family: String =
            row.try_get("token_family")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get token_family: {}", e),
                })?;
        let parent_token_id: Option<String> =
            row.try_get("parent_token_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get parent_token_id: {}", e),
                })?;

        let parse_uuid = |value: &str, field: &str| {
            Uuid::parse_str(value).map_err(|e| DomainError::Internal {
                message: format!("Invalid {} UUID: {}", field, e),
            })
        };

        Ok(RefreshTokenRecord {
            id: parse_uuid(&id, "token")?,
            session_id: parse_uuid(&session_id, "session")?,
            token_family: parse_uuid(&token_family, "family")?,
            parent_token_id: parent_token_id
                .as_deref()
                .map(|v| parse_uuid(v, "parent token"))
                .transpose()?,
            token_hash: row.try_get("token_hash").map_err(|e| DomainError::Internal {
                message: format!("Failed to get token_hash: {}", e),
            })?,
            lookup_fingerprint: row
                .try_get("lookup_fingerprint")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get lookup_fingerprint: {}", e),
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
            used_at: row
                .try_get::<Option<DateTime<Utc>>, _>("used_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get used_at: {}", e),
                })?,
        })
    }

    fn storage_error(context: &str, e: sqlx::Error) -> DomainError {
        DomainError::Storage {
            message: format!("{}: {}", context, e),
        }
    }

    async fn insert_record<'e, E>(record: &RefreshTokenRecord, executor: E) -> Result<(), DomainError>
    where
        E: sqlx::Executor<'e, Database = sqlx::MySql>,
    {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, session_id, token_family, parent_token_id, token_hash,
                lookup_fingerprint, created_at, expires_at, used_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(record.session_id.to_string())
            .bind(record.token_family.to_string())
            .bind(record.parent_token_id.map(|id| id.to_string()))
            .bind(&record.token_hash)
            .bind(&record.lookup_fingerprint)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.used_at)
            .execute(executor)
            .await
            .map_err(|e| Self::storage_error("Failed to insert refresh token", e))?;

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        Self::insert_record(&record, &self.pool).await?;
        Ok(record)
    }

    async fn find_live(&self, now: DateTime<Utc>) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!("{} WHERE used_at IS NULL AND expires_at > ?", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to load live tokens", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn find_used(&self) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!("{} WHERE used_at IS NOT NULL", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to load used tokens", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn rotate(
        &self,
        parent_id: Uuid,
        child: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::storage_error("Failed to begin rotation", e))?;

        let swap = r#"
            UPDATE refresh_tokens
            SET used_at = ?
            WHERE id = ? AND used_at IS NULL
        "#;

        let result = sqlx::query(swap)
            .bind(Utc::now())
            .bind(parent_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::storage_error("Failed to consume parent token", e))?;

        if result.rows_affected() == 0 {
            // Already consumed (or deleted): the caller lost the race
            tx.rollback()
                .await
                .map_err(|e| Self::storage_error("Failed to roll back rotation", e))?;
            return Err(DomainError::Token(TokenError::TokenAlreadyUsed));
        }

        Self::insert_record(&child, &mut *tx).await?;

        tx.commit()
            .await
            .map_err(|e| Self::storage_error("Failed to commit rotation", e))?;

        Ok(child)
    }

    async fn delete_for_session(&self, session_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to delete session tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn find_by_family(&self, family: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "{} WHERE token_family = ? ORDER BY created_at ASC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(family.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::storage_error("Failed to load token family", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
