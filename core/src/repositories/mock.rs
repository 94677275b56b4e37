//! In-memory implementation of the session store and refresh token ledger.
//!
//! One store implements both repository traits over a single lock so the
//! compound operations (revoke-and-delete-tokens, consume-and-insert-child)
//! are atomic exactly the way the database transactions are in production.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use async_trait::async_trait;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::{DomainError, TokenError};
use crate::repositories::session::SessionRepository;
use crate::repositories::token::RefreshTokenRepository;

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, Session>,
    tokens: HashMap<Uuid, RefreshTokenRecord>,
}

/// In-memory auth store for testing
#[derive(Clone, Default)]
pub struct InMemoryAuthStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ledger entries currently stored, across all sessions
    pub fn token_count(&self) -> usize {
        self.inner.lock().unwrap().tokens.len()
    }

    /// Number of session rows currently stored, in any state
    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    /// Direct session lookup for assertions, ignoring revocation state
    pub fn session(&self, session_id: Uuid) -> Option<Session> {
        self.inner.lock().unwrap().sessions.get(&session_id).cloned()
    }

    /// Overwrite a stored session, for tests that backdate activity or expiry
    pub fn put_session(&self, session: Session) {
        self.inner.lock().unwrap().sessions.insert(session.id, session);
    }
}

#[async_trait]
impl SessionRepository for InMemoryAuthStore {
    async fn insert(&self, session: Session) -> Result<Session, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.sessions.get(&session_id).cloned())
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> Result<bool, DomainError> {
        let mut inner = self.inner.lock().unwrap();

        let newly_revoked = match inner.sessions.get_mut(&session_id) {
            Some(session) if !session.revoked => {
                session.revoke(reason);
                true
            }
            _ => false,
        };

        inner.tokens.retain(|_, token| token.session_id != session_id);
        Ok(newly_revoked)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        let mut inner = self.inner.lock().unwrap();

        let mut revoked_ids = Vec::new();
        for session in inner.sessions.values_mut() {
            if session.user_id == user_id && !session.revoked {
                session.revoke(reason);
                revoked_ids.push(session.id);
            }
        }

        inner
            .tokens
            .retain(|_, token| !revoked_ids.contains(&token.session_id));
        Ok(revoked_ids.len())
    }

    async fn touch_activity(&self, session_id: Uuid) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(session) = inner.sessions.get_mut(&session_id) {
            session.touch();
        }
        Ok(())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut inner = self.inner.lock().unwrap();

        let expired_ids: Vec<Uuid> = inner
            .sessions
            .values()
            .filter(|s| s.expires_at < cutoff)
            .map(|s| s.id)
            .collect();

        inner.sessions.retain(|id, _| !expired_ids.contains(id));
        inner
            .tokens
            .retain(|_, token| !expired_ids.contains(&token.session_id));

        Ok(expired_ids.len())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryAuthStore {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.tokens.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_live(&self, now: DateTime<Utc>) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tokens
            .values()
            .filter(|t| t.used_at.is_none() && t.expires_at > now)
            .cloned()
            .collect())
    }

    async fn find_used(&self) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tokens
            .values()
            .filter(|t| t.used_at.is_some())
            .cloned()
            .collect())
    }

    async fn rotate(
        &self,
        parent_id: Uuid,
        child: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let mut inner = self.inner.lock().unwrap();

        // A vanished parent behaves like a consumed one: the caller must
        // treat either as a lost race.
        match inner.tokens.get_mut(&parent_id) {
            Some(parent) if parent.used_at.is_none() => {
                parent.used_at = Some(Utc::now());
            }
            _ => return Err(DomainError::Token(TokenError::TokenAlreadyUsed)),
        }

        inner.tokens.insert(child.id, child.clone());
        Ok(child)
    }

    async fn delete_for_session(&self, session_id: Uuid) -> Result<usize, DomainError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.tokens.len();
        inner.tokens.retain(|_, token| token.session_id != session_id);
        Ok(before - inner.tokens.len())
    }

    async fn find_by_family(&self, family: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tokens
            .values()
            .filter(|t| t.token_family == family)
            .cloned()
            .collect())
    }
}
