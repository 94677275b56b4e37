//! Token entities: JWT access token claims and the refresh token ledger.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token expiration time (10 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 10;

/// Refresh token expiration time (30 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// JWT issuer
pub const JWT_ISSUER: &str = "payvault";

/// JWT audience
pub const JWT_AUDIENCE: &str = "payvault-api";

/// Claims structure for the JWT access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Session the token is bound to
    pub sid: String,

    /// Role name of the subject, if assigned
    pub role: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Creates claims for a new access token
    ///
    /// # Arguments
    ///
    /// * `user_id` - The subject user's UUID
    /// * `session_id` - The session the token is bound to
    /// * `role` - The subject's role name, if any
    /// * `ttl_seconds` - Access token lifetime in seconds
    pub fn new_access_token(
        user_id: Uuid,
        session_id: Uuid,
        role: Option<String>,
        ttl_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::seconds(ttl_seconds);

        Self {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        now >= self.exp
    }

    /// Checks if the claims are valid (not expired and after nbf)
    pub fn is_valid(&self) -> bool {
        let now = Utc::now().timestamp();
        now >= self.nbf && now < self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Gets the session ID from the claims
    pub fn session_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sid)
    }
}

/// One entry in the refresh token ledger
///
/// Entries form a chain per family: the root has `parent_token_id == None`,
/// every rotation appends a child pointing back at the token it replaced.
/// Only the hash of the secret is stored; the raw secret is handed to the
/// client exactly once at issuance. A consumed entry keeps its row with
/// `used_at` set so a later replay can be recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the ledger entry
    pub id: Uuid,

    /// Session this token belongs to
    pub session_id: Uuid,

    /// Lineage shared by every token descended from one login
    pub token_family: Uuid,

    /// The entry this one replaced, None for a family root
    pub parent_token_id: Option<Uuid>,

    /// Memory-hard hash of the token secret
    pub token_hash: String,

    /// Truncated fast hash of the secret, used only as a scan prefilter
    pub lookup_fingerprint: String,

    /// Timestamp when the entry was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Set exactly once, when the token is rotated away
    pub used_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Creates a family root entry for a freshly created session
    pub fn new_root(
        session_id: Uuid,
        token_hash: String,
        lookup_fingerprint: String,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            session_id,
            token_family: Uuid::new_v4(),
            parent_token_id: None,
            token_hash,
            lookup_fingerprint,
            created_at: now,
            expires_at: now + ttl,
            used_at: None,
        }
    }

    /// Creates the child entry that replaces `parent` on rotation
    ///
    /// The child stays in the parent's family and records the back-reference
    /// that makes the chain reconstructable.
    pub fn new_child(
        parent: &RefreshTokenRecord,
        token_hash: String,
        lookup_fingerprint: String,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            session_id: parent.session_id,
            token_family: parent.token_family,
            parent_token_id: Some(parent.id),
            token_hash,
            lookup_fingerprint,
            created_at: now,
            expires_at: now + ttl,
            used_at: None,
        }
    }

    /// Checks if the token is past its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Checks if the token has been rotated away
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Checks if this entry is the live tip of its chain
    pub fn is_live(&self) -> bool {
        !self.is_used() && !self.is_expired()
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token secret
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair with explicit expiry windows
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_claims() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let claims = Claims::new_access_token(user_id, session_id, Some("member".to_string()), 600);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.sid, session_id.to_string());
        assert_eq!(claims.role, Some("member".to_string()));
        assert_eq!(claims.iss, JWT_ISSUER);
        assert_eq!(claims.aud, JWT_AUDIENCE);
        assert!(claims.is_valid());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_id_parsing() {
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let claims = Claims::new_access_token(user_id, session_id, None, 600);

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.session_id().unwrap(), session_id);
    }

    #[test]
    fn test_claims_expiration() {
        let mut claims = Claims::new_access_token(Uuid::new_v4(), Uuid::new_v4(), None, 600);
        claims.exp = Utc::now().timestamp() - 1;

        assert!(claims.is_expired());
        assert!(!claims.is_valid());
    }

    #[test]
    fn test_root_record_starts_family() {
        let session_id = Uuid::new_v4();
        let record = RefreshTokenRecord::new_root(
            session_id,
            "hash".to_string(),
            "fp".to_string(),
            Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        );

        assert_eq!(record.session_id, session_id);
        assert!(record.parent_token_id.is_none());
        assert!(record.is_live());
        assert!(!record.is_used());
    }

    #[test]
    fn test_child_record_inherits_family() {
        let root = RefreshTokenRecord::new_root(
            Uuid::new_v4(),
            "hash-a".to_string(),
            "fp-a".to_string(),
            Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        );
        let child = RefreshTokenRecord::new_child(
            &root,
            "hash-b".to_string(),
            "fp-b".to_string(),
            Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        );

        assert_eq!(child.token_family, root.token_family);
        assert_eq!(child.session_id, root.session_id);
        assert_eq!(child.parent_token_id, Some(root.id));
        assert_ne!(child.id, root.id);
    }

    #[test]
    fn test_used_record_is_not_live() {
        let mut record = RefreshTokenRecord::new_root(
            Uuid::new_v4(),
            "hash".to_string(),
            "fp".to_string(),
            Duration::days(1),
        );
        record.used_at = Some(Utc::now());

        assert!(record.is_used());
        assert!(!record.is_live());
    }

    #[test]
    fn test_expired_record_is_not_live() {
        let mut record = RefreshTokenRecord::new_root(
            Uuid::new_v4(),
            "hash".to_string(),
            "fp".to_string(),
            Duration::days(1),
        );
        record.expires_at = Utc::now() - Duration::hours(1);

        assert!(record.is_expired());
        assert!(!record.is_live());
    }

    #[test]
    fn test_token_pair_serialization() {
        let pair = TokenPair::new("access".to_string(), "refresh".to_string(), 600, 2_592_000);
        let json = serde_json::to_string(&pair).unwrap();
        let deserialized: TokenPair = serde_json::from_str(&json).unwrap();

        assert_eq!(pair, deserialized);
    }
}
