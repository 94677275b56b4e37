//! Minimal user identity as reported by the credential verifier.
//!
//! User accounts are owned by a separate service; the auth core only ever
//! sees this projection of them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity returned by the user directory for a verified or looked-up account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// The user's UUID
    pub id: Uuid,

    /// Primary email address
    pub email: String,

    /// Role name, if one is assigned
    pub role: Option<String>,

    /// Whether the account is allowed to authenticate
    pub active: bool,
}

impl UserIdentity {
    /// Creates an active identity
    pub fn new(id: Uuid, email: impl Into<String>, role: Option<String>) -> Self {
        Self {
            id,
            email: email.into(),
            role,
            active: true,
        }
    }
}
