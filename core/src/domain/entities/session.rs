//! Session entity representing one logical login.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime, fixed at creation (30 days)
pub const SESSION_EXPIRY_DAYS: i64 = 30;

/// Days without a successful rotation before a session is considered idle
pub const IDLE_TIMEOUT_DAYS: i64 = 7;

/// Days past expiry before a session row becomes eligible for pruning
pub const PRUNE_GRACE_DAYS: i64 = 90;

/// Why a session was terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevocationReason {
    UserLogout,
    PasswordChange,
    IdleTimeout,
    TokenReuse,
    AdminAction,
}

impl RevocationReason {
    /// Stable string form used for persistence and audit records
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::UserLogout => "USER_LOGOUT",
            RevocationReason::PasswordChange => "PASSWORD_CHANGE",
            RevocationReason::IdleTimeout => "IDLE_TIMEOUT",
            RevocationReason::TokenReuse => "TOKEN_REUSE",
            RevocationReason::AdminAction => "ADMIN_ACTION",
        }
    }

    /// Parse the persisted string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER_LOGOUT" => Some(RevocationReason::UserLogout),
            "PASSWORD_CHANGE" => Some(RevocationReason::PasswordChange),
            "IDLE_TIMEOUT" => Some(RevocationReason::IdleTimeout),
            "TOKEN_REUSE" => Some(RevocationReason::TokenReuse),
            "ADMIN_ACTION" => Some(RevocationReason::AdminAction),
            _ => None,
        }
    }
}

impl std::fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical login for one device/client instance
///
/// A session is either active (`revoked == false` and not past `expires_at`)
/// or terminal; once revoked it never transitions back. Revocation cascades
/// to the session's refresh token chain. Rows outlive revocation and are
/// only deleted by the pruner once well past expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier, also carried in access token claims
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,

    /// Hard expiry, fixed at creation
    pub expires_at: DateTime<Utc>,

    /// Timestamp of the last successful token rotation
    pub last_activity_at: DateTime<Utc>,

    /// Whether the session has been terminated
    pub revoked: bool,

    /// When the session was revoked, if it was
    pub revoked_at: Option<DateTime<Utc>>,

    /// Why the session was revoked, if it was
    pub revocation_reason: Option<RevocationReason>,

    /// Client IP at login, stored for audit only
    pub ip_address: Option<String>,

    /// Client user agent at login, stored for audit only
    pub user_agent: Option<String>,
}

impl Session {
    /// Creates a new active session for a user
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user's UUID
    /// * `ip_address` - Optional client IP for audit
    /// * `user_agent` - Optional client user agent for audit
    ///
    /// # Returns
    ///
    /// A new `Session` expiring `SESSION_EXPIRY_DAYS` from now
    pub fn new(user_id: Uuid, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self::with_ttl(
            user_id,
            ip_address,
            user_agent,
            Duration::days(SESSION_EXPIRY_DAYS),
        )
    }

    /// Creates a new active session with an explicit lifetime
    pub fn with_ttl(
        user_id: Uuid,
        ip_address: Option<String>,
        user_agent: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
            last_activity_at: now,
            revoked: false,
            revoked_at: None,
            revocation_reason: None,
            ip_address,
            user_agent,
        }
    }

    /// Checks if the session is past its hard expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Checks if the session is usable (not revoked, not expired)
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }

    /// Checks if the session has gone without rotation for longer than `idle_timeout`
    pub fn is_idle(&self, idle_timeout: Duration) -> bool {
        Utc::now() - self.last_activity_at > idle_timeout
    }

    /// Marks the session revoked with a reason
    ///
    /// Idempotent: a session that is already revoked keeps its original
    /// reason and timestamp.
    pub fn revoke(&mut self, reason: RevocationReason) {
        if self.revoked {
            return;
        }
        self.revoked = true;
        self.revoked_at = Some(Utc::now());
        self.revocation_reason = Some(reason);
    }

    /// Records a successful rotation
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_active() {
        let user_id = Uuid::new_v4();
        let session = Session::new(user_id, Some("10.0.0.1".to_string()), None);

        assert_eq!(session.user_id, user_id);
        assert!(session.is_active());
        assert!(!session.is_expired());
        assert!(!session.revoked);
        assert!(session.revocation_reason.is_none());
        assert_eq!(session.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_session_expiry_window() {
        let session = Session::new(Uuid::new_v4(), None, None);
        let expected = session.created_at + Duration::days(SESSION_EXPIRY_DAYS);
        assert_eq!(session.expires_at, expected);
    }

    #[test]
    fn test_expired_session_is_not_active() {
        let mut session = Session::new(Uuid::new_v4(), None, None);
        session.expires_at = Utc::now() - Duration::hours(1);

        assert!(session.is_expired());
        assert!(!session.is_active());
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut session = Session::new(Uuid::new_v4(), None, None);

        session.revoke(RevocationReason::UserLogout);
        let first_revoked_at = session.revoked_at;

        session.revoke(RevocationReason::TokenReuse);

        assert!(session.revoked);
        assert_eq!(session.revocation_reason, Some(RevocationReason::UserLogout));
        assert_eq!(session.revoked_at, first_revoked_at);
    }

    #[test]
    fn test_idle_detection() {
        let mut session = Session::new(Uuid::new_v4(), None, None);
        assert!(!session.is_idle(Duration::days(IDLE_TIMEOUT_DAYS)));

        session.last_activity_at = Utc::now() - Duration::days(IDLE_TIMEOUT_DAYS + 1);
        assert!(session.is_idle(Duration::days(IDLE_TIMEOUT_DAYS)));
    }

    #[test]
    fn test_revocation_reason_round_trip() {
        for reason in [
            RevocationReason::UserLogout,
            RevocationReason::PasswordChange,
            RevocationReason::IdleTimeout,
            RevocationReason::TokenReuse,
            RevocationReason::AdminAction,
        ] {
            assert_eq!(RevocationReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(RevocationReason::parse("UNKNOWN"), None);
    }
}
