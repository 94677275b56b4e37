//! Configuration for the session service

use chrono::Duration;

use crate::domain::entities::session::SESSION_EXPIRY_DAYS;

/// Configuration for the session service
#[derive(Debug, Clone)]
pub struct SessionServiceConfig {
    /// Session lifetime in days, fixed at creation
    pub session_ttl_days: i64,
}

impl Default for SessionServiceConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: SESSION_EXPIRY_DAYS,
        }
    }
}

impl SessionServiceConfig {
    /// Session lifetime as a duration
    pub fn session_ttl(&self) -> Duration {
        Duration::days(self.session_ttl_days)
    }
}
