//! Audit log entity for recording authentication and security events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Event types for authentication auditing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    // Login events
    LoginSuccess,
    LoginFailure,

    // Rotation events
    TokenRefreshed,
    RefreshTokenRejected,
    TokenReuseDetected,

    // Session events
    Logout,
    SessionRevoked,
    SessionsRevokedForUser,
}

impl AuditEventType {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::LoginFailure => "LOGIN_FAILURE",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::RefreshTokenRejected => "REFRESH_TOKEN_REJECTED",
            Self::TokenReuseDetected => "TOKEN_REUSE_DETECTED",
            Self::Logout => "LOGOUT",
            Self::SessionRevoked => "SESSION_REVOKED",
            Self::SessionsRevokedForUser => "SESSIONS_REVOKED_FOR_USER",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOGIN_SUCCESS" => Some(Self::LoginSuccess),
            "LOGIN_FAILURE" => Some(Self::LoginFailure),
            "TOKEN_REFRESHED" => Some(Self::TokenRefreshed),
            "REFRESH_TOKEN_REJECTED" => Some(Self::RefreshTokenRejected),
            "TOKEN_REUSE_DETECTED" => Some(Self::TokenReuseDetected),
            "LOGOUT" => Some(Self::Logout),
            "SESSION_REVOKED" => Some(Self::SessionRevoked),
            "SESSIONS_REVOKED_FOR_USER" => Some(Self::SessionsRevokedForUser),
            _ => None,
        }
    }

    /// Broad grouping used for filtering audit trails
    pub fn category(&self) -> &'static str {
        match self {
            Self::LoginSuccess | Self::LoginFailure => "AUTHENTICATION",
            Self::TokenRefreshed | Self::RefreshTokenRejected => "TOKEN",
            Self::TokenReuseDetected => "SECURITY",
            Self::Logout | Self::SessionRevoked | Self::SessionsRevokedForUser => "SESSION",
        }
    }
}

/// Represents an audit log entry for authentication and security events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    /// Unique identifier for the log entry
    pub id: Uuid,

    /// Type of event
    pub event_type: AuditEventType,

    /// User the event is about, if known
    pub subject_user_id: Option<Uuid>,

    /// Resource the event touched (session ID, token family)
    pub resource_id: Option<Uuid>,

    /// User who triggered the event, when different from the subject
    pub actor_user_id: Option<Uuid>,

    /// IP address of the request
    pub ip_address: Option<String>,

    /// User agent string from the request
    pub user_agent: Option<String>,

    /// Free-form event details
    pub metadata: Option<JsonValue>,

    /// Timestamp when the event was recorded
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    /// Creates a new audit log entry for an event type
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            subject_user_id: None,
            resource_id: None,
            actor_user_id: None,
            ip_address: None,
            user_agent: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the subject user
    pub fn with_subject(mut self, user_id: Uuid) -> Self {
        self.subject_user_id = Some(user_id);
        self
    }

    /// Attach the resource (session, token family) the event touched
    pub fn with_resource(mut self, resource_id: Uuid) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    /// Attach the acting user when different from the subject
    pub fn with_actor(mut self, user_id: Uuid) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Attach request context
    pub fn with_request_context(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Attach free-form details
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
