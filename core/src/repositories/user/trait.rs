//! User directory trait: the narrow seam to the external account system.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::UserIdentity;
use crate::errors::DomainError;

/// Collaborator contract for credential checking and identity lookup
///
/// Account storage, password hashing, and user lifecycle live in another
/// service. The auth core only needs these two read operations; it never
/// sees password material.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Check an email/password pair
    ///
    /// # Returns
    /// * `Ok(Some(UserIdentity))` - Credentials match (account may still be inactive)
    /// * `Ok(None)` - Unknown email or wrong password
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserIdentity>, DomainError>;

    /// Look up an identity by user ID, for re-minting claims on rotation
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserIdentity>, DomainError>;
}
