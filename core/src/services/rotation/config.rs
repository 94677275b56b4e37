//! Configuration for the rotation engine

use chrono::Duration;

use crate::domain::entities::session::IDLE_TIMEOUT_DAYS;
use crate::domain::entities::token::REFRESH_TOKEN_EXPIRY_DAYS;

/// Configuration for the rotation engine
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,
    /// Days without a successful rotation before the session is revoked
    pub idle_timeout_days: i64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            refresh_token_ttl_days: REFRESH_TOKEN_EXPIRY_DAYS,
            idle_timeout_days: IDLE_TIMEOUT_DAYS,
        }
    }
}

impl RotationConfig {
    /// Refresh token lifetime as a duration
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_ttl_days)
    }

    /// Idle timeout as a duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::days(self.idle_timeout_days)
    }

    /// Refresh token lifetime in seconds, for client-facing expiry fields
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_days * 24 * 60 * 60
    }
}
