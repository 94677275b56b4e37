//! Authentication and session configuration

use serde::{Deserialize, Serialize};

/// JWT access token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Algorithm for JWT signing (default: HS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from("your-secret-key-change-in-production"),
            access_token_expiry: 600, // 10 minutes
            issuer: String::from("payvault"),
            audience: String::from("payvault-api"),
            algorithm: default_algorithm(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "your-secret-key-change-in-production"
    }
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session lifetime in days, fixed at creation
    pub session_ttl_days: i64,

    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,

    /// Days without a successful rotation before a session is revoked
    pub idle_timeout_days: i64,

    /// Days past expiry before the pruner deletes a session row
    pub prune_grace_days: i64,

    /// How often the session pruner runs, in seconds
    #[serde(default = "default_prune_interval")]
    pub prune_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: 30,
            refresh_token_ttl_days: 30,
            idle_timeout_days: 7,
            prune_grace_days: 90,
            prune_interval_seconds: default_prune_interval(),
        }
    }
}

/// Parameters for the memory-hard hashing of refresh token secrets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecretHashConfig {
    /// Argon2 memory cost in KiB
    pub memory_kib: u32,

    /// Argon2 iteration count
    pub time_cost: u32,

    /// Argon2 lane count
    pub parallelism: u32,
}

impl Default for SecretHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Combined authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT settings
    pub jwt: JwtConfig,

    /// Session lifecycle settings
    pub session: SessionConfig,

    /// Refresh secret hashing settings
    #[serde(default)]
    pub secret_hash: SecretHashConfig,
}

impl AuthConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.jwt.secret = secret;
        }
        if let Ok(expiry) = std::env::var("ACCESS_TOKEN_EXPIRY_SECONDS") {
            if let Ok(seconds) = expiry.parse() {
                config.jwt.access_token_expiry = seconds;
            }
        }
        if let Ok(days) = std::env::var("SESSION_TTL_DAYS") {
            if let Ok(days) = days.parse() {
                config.session.session_ttl_days = days;
            }
        }
        config
    }
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_prune_interval() -> u64 {
    86400 // daily
}
