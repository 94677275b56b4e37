//! The refresh token rotation engine.
//!
//! Every `/auth/refresh` call funnels through [`RotationService::rotate`],
//! which classifies the presented secret and either advances the family
//! chain by one link or rejects. All rejection causes collapse into the
//! same client-facing error; the precise cause is only logged and audited,
//! so callers cannot use the endpoint as an oracle for which tokens exist.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::token::{RefreshTokenRecord, TokenPair};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::audit::{AuditLogRepository, NoOpAuditLogRepository};
use crate::repositories::session::SessionRepository;
use crate::repositories::token::RefreshTokenRepository;
use crate::repositories::user::UserDirectory;
use crate::services::audit::AuditService;
use crate::services::token::TokenService;

use super::config::RotationConfig;

/// Outcome of a successful rotation
#[derive(Debug, Clone)]
pub struct RotatedTokens {
    /// The new access/refresh pair
    pub token_pair: TokenPair,
    /// Session the rotation happened in
    pub session_id: Uuid,
    /// Owner of the session
    pub user_id: Uuid,
}

/// Why a rotation was refused; internal only, never shown to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RotationRejection {
    UnknownSecret,
    SessionMissing,
    SessionRevoked,
    SessionExpired,
    IdleTimeout,
    ReuseDetected,
    UserMissing,
}

impl RotationRejection {
    fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownSecret => "unknown_secret",
            Self::SessionMissing => "session_missing",
            Self::SessionRevoked => "session_revoked",
            Self::SessionExpired => "session_expired",
            Self::IdleTimeout => "idle_timeout",
            Self::ReuseDetected => "reuse_detected",
            Self::UserMissing => "user_missing",
        }
    }
}

/// Rotation engine over the session store and refresh token ledger
pub struct RotationService<S, T, U, A = NoOpAuditLogRepository>
where
    S: SessionRepository,
    T: RefreshTokenRepository,
    U: UserDirectory,
    A: AuditLogRepository + 'static,
{
    sessions: Arc<S>,
    tokens: Arc<T>,
    users: Arc<U>,
    token_service: Arc<TokenService>,
    audit_service: Option<Arc<AuditService<A>>>,
    config: RotationConfig,
}

impl<S, T, U, A> RotationService<S, T, U, A>
where
    S: SessionRepository,
    T: RefreshTokenRepository,
    U: UserDirectory,
    A: AuditLogRepository + 'static,
{
    /// Create a new rotation engine
    pub fn new(
        sessions: Arc<S>,
        tokens: Arc<T>,
        users: Arc<U>,
        token_service: Arc<TokenService>,
        config: RotationConfig,
    ) -> Self {
        Self {
            sessions,
            tokens,
            users,
            token_service,
            audit_service: None,
            config,
        }
    }

    /// Create a new rotation engine with audit logging
    pub fn with_audit(
        sessions: Arc<S>,
        tokens: Arc<T>,
        users: Arc<U>,
        token_service: Arc<TokenService>,
        audit_service: Arc<AuditService<A>>,
        config: RotationConfig,
    ) -> Self {
        Self {
            sessions,
            tokens,
            users,
            token_service,
            audit_service: Some(audit_service),
            config,
        }
    }

    /// Starts a new token family for a freshly created session
    ///
    /// Generates the root secret, persists only its hash and fingerprint,
    /// and returns the raw secret. The secret cannot be recovered later.
    ///
    /// # Arguments
    ///
    /// * `session` - The session the family will belong to
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The raw refresh secret, to be handed to the client
    /// * `Err(DomainError)` - Secret generation or storage failed
    pub async fn issue_root_token(&self, session: &Session) -> DomainResult<String> {
        let secret = self.token_service.generate_refresh_secret();
        let token_hash = self.token_service.hash_refresh_secret(&secret)?;
        let fingerprint = self.token_service.fingerprint(&secret);

        let record = RefreshTokenRecord::new_root(
            session.id,
            token_hash,
            fingerprint,
            self.config.refresh_token_ttl(),
        );

        debug!(
            session_id = %session.id,
            token_family = %record.token_family,
            "Issuing refresh token family root"
        );

        self.tokens.insert(record).await?;
        Ok(secret)
    }

    /// Exchange a presented refresh secret for a new access/refresh pair
    ///
    /// The presented secret is classified against the ledger:
    /// a live match whose session is healthy rotates the chain forward;
    /// a match on an already-consumed entry is treated as theft and kills
    /// the whole session; everything else is refused. Two rotations racing
    /// on the same secret resolve through the ledger's compare-and-swap:
    /// the loser observes the entry as consumed and lands in the reuse
    /// branch as well.
    ///
    /// # Returns
    ///
    /// * `Ok(RotatedTokens)` - The new pair plus session/user identifiers
    /// * `Err(DomainError::Token(InvalidRefreshToken))` - Any rejection
    /// * `Err(DomainError)` - Storage failure
    pub async fn rotate(&self, presented_secret: &str) -> DomainResult<RotatedTokens> {
        let now = Utc::now();
        let fingerprint = self.token_service.fingerprint(presented_secret);

        let matched = self.find_live_match(presented_secret, &fingerprint).await?;

        let Some(record) = matched else {
            return self.handle_possible_reuse(presented_secret, &fingerprint).await;
        };

        let session = match self.sessions.find_by_id(record.session_id).await? {
            Some(session) => session,
            None => return self.reject(RotationRejection::SessionMissing, Some(&record)),
        };

        if session.revoked {
            return self.reject(RotationRejection::SessionRevoked, Some(&record));
        }
        if session.expires_at < now {
            return self.reject(RotationRejection::SessionExpired, Some(&record));
        }

        if session.is_idle(self.config.idle_timeout()) {
            // The revocation itself must stick; a failure here is fatal to
            // the request rather than silently ignored.
            self.sessions
                .revoke(session.id, RevocationReason::IdleTimeout)
                .await?;
            self.audit_session_revoked(session.user_id, session.id, RevocationReason::IdleTimeout)
                .await;
            return self.reject(RotationRejection::IdleTimeout, Some(&record));
        }

        let user = match self.users.find_by_id(session.user_id).await? {
            Some(user) => user,
            None => return self.reject(RotationRejection::UserMissing, Some(&record)),
        };

        let new_secret = self.token_service.generate_refresh_secret();
        let new_hash = self.token_service.hash_refresh_secret(&new_secret)?;
        let new_fingerprint = self.token_service.fingerprint(&new_secret);
        let child = RefreshTokenRecord::new_child(
            &record,
            new_hash,
            new_fingerprint,
            self.config.refresh_token_ttl(),
        );

        match self.tokens.rotate(record.id, child).await {
            Ok(_) => {}
            Err(DomainError::Token(TokenError::TokenAlreadyUsed)) => {
                // Lost a race on this secret: someone rotated it between our
                // scan and the swap. Indistinguishable from replay, so the
                // session dies either way.
                self.revoke_for_reuse(&record).await?;
                return self.reject(RotationRejection::ReuseDetected, Some(&record));
            }
            Err(e) => return Err(e),
        }

        self.sessions.touch_activity(session.id).await?;

        let access_token =
            self.token_service
                .issue_access_token(user.id, session.id, user.role.clone())?;

        info!(
            session_id = %session.id,
            token_family = %record.token_family,
            "Refresh token rotated"
        );
        if let Some(audit) = &self.audit_service {
            audit.log_token_refreshed(user.id, session.id).await;
        }

        Ok(RotatedTokens {
            token_pair: TokenPair::new(
                access_token,
                new_secret,
                self.token_service.access_token_ttl_seconds(),
                self.config.refresh_token_ttl_seconds(),
            ),
            session_id: session.id,
            user_id: user.id,
        })
    }

    /// Scan the live tips for an entry whose hash matches the secret
    ///
    /// The fingerprint narrows the scan; the Argon2 verify is the
    /// authoritative check and runs constant-time per candidate.
    async fn find_live_match(
        &self,
        presented_secret: &str,
        fingerprint: &str,
    ) -> DomainResult<Option<RefreshTokenRecord>> {
        let candidates = self.tokens.find_live(Utc::now()).await?;

        for candidate in candidates {
            if candidate.lookup_fingerprint != fingerprint {
                continue;
            }
            if self
                .token_service
                .verify_refresh_secret(presented_secret, &candidate.token_hash)
            {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    /// No live entry matched: check whether the secret was already consumed
    ///
    /// A match against a used entry is the replay signal. The legitimate
    /// chain and the attacker's chain cannot be told apart after a fork, so
    /// the owning session and its entire ledger are destroyed.
    async fn handle_possible_reuse(
        &self,
        presented_secret: &str,
        fingerprint: &str,
    ) -> DomainResult<RotatedTokens> {
        let used = self.tokens.find_used().await?;

        for record in used {
            if record.lookup_fingerprint != fingerprint {
                continue;
            }
            if self
                .token_service
                .verify_refresh_secret(presented_secret, &record.token_hash)
            {
                self.revoke_for_reuse(&record).await?;
                return self.reject(RotationRejection::ReuseDetected, Some(&record));
            }
        }

        self.reject(RotationRejection::UnknownSecret, None)
    }

    /// Kill the session that owns `record` after a replay was recognized
    ///
    /// Errors propagate: if the revocation cannot be written, the request
    /// fails rather than silently leaving the session alive.
    async fn revoke_for_reuse(&self, record: &RefreshTokenRecord) -> DomainResult<()> {
        warn!(
            session_id = %record.session_id,
            token_family = %record.token_family,
            "Refresh token reuse detected, revoking session"
        );

        self.sessions
            .revoke(record.session_id, RevocationReason::TokenReuse)
            .await?;

        if let Some(audit) = &self.audit_service {
            // Best-effort enrichment: the session row may already be gone.
            let subject = self
                .sessions
                .find_by_id(record.session_id)
                .await
                .ok()
                .flatten()
                .map(|s| s.user_id);
            audit
                .log_reuse_detected(subject, record.session_id, record.token_family)
                .await;
        }

        Ok(())
    }

    /// Refuse the rotation with the single client-facing error
    fn reject(
        &self,
        cause: RotationRejection,
        record: Option<&RefreshTokenRecord>,
    ) -> DomainResult<RotatedTokens> {
        match record {
            Some(record) => debug!(
                cause = cause.as_str(),
                session_id = %record.session_id,
                token_family = %record.token_family,
                "Refresh token rejected"
            ),
            None => debug!(cause = cause.as_str(), "Refresh token rejected"),
        }

        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    }

    async fn audit_session_revoked(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        reason: RevocationReason,
    ) {
        if let Some(audit) = &self.audit_service {
            audit.log_session_revoked(user_id, session_id, reason).await;
        }
    }
}
