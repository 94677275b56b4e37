//! MySQL implementation of the UserDirectory trait.
//!
//! Thin glue over the account service's users table: an email lookup plus
//! a bcrypt verification. The auth core never touches password material
//! beyond this boundary.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pv_core::domain::entities::user::UserIdentity;
use pv_core::errors::DomainError;
use pv_core::repositories::user::UserDirectory;

/// MySQL implementation of UserDirectory
pub struct MySqlUserDirectory {
    /// Database connection pool
    pool: MySqlPool,
}

struct UserRow {
    identity: UserIdentity,
    password_hash: String,
}

impl MySqlUserDirectory {
    /// Create a new MySQL user directory
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<UserRow, DomainError> {
        let internal = |field: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", field, e),
        };

        let id: String = row.try_get("id").map_err(|e| internal("id", e))?;
        let email: String = row.try_get("email").map_err(|e| internal("email", e))?;
        let role: Option<String> = row.try_get("role").map_err(|e| internal("role", e))?;
        let status: String = row.try_get("status").map_err(|e| internal("status", e))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| internal("password_hash", e))?;

        let id = Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
            message: format!("Invalid user UUID: {}", e),
        })?;

        let mut identity = UserIdentity::new(id, email, role);
        identity.active = status == "ACTIVE";

        Ok(UserRow {
            identity,
            password_hash,
        })
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<UserRow>, DomainError> {
        let query = r#"
            SELECT id, email, password_hash, role, status
            FROM users
            WHERE email = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Storage {
                message: format!("Failed to find user by email: {}", e),
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        let Some(user) = self.fetch_by_email(email).await? else {
            return Ok(None);
        };

        let matches = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
        Ok(matches.then_some(user.identity))
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserIdentity>, DomainError> {
        let query = r#"
            SELECT id, email, password_hash, role, status
            FROM users
            WHERE id = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Storage {
                message: format!("Failed to find user by id: {}", e),
            })?;

        Ok(row
            .as_ref()
            .map(Self::row_to_user)
            .transpose()?
            .map(|u| u.identity))
    }
}
