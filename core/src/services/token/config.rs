//! Configuration for the token service

use jsonwebtoken::Algorithm;

use crate::domain::entities::token::ACCESS_TOKEN_EXPIRY_MINUTES;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token expiry in seconds
    pub access_token_ttl_seconds: i64,
    /// Argon2 memory cost for refresh secrets, in KiB
    pub hash_memory_kib: u32,
    /// Argon2 iteration count for refresh secrets
    pub hash_time_cost: u32,
    /// Argon2 lane count for refresh secrets
    pub hash_parallelism: u32,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_token_ttl_seconds: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
            hash_memory_kib: 65536, // 64 MiB
            hash_time_cost: 3,
            hash_parallelism: 4,
        }
    }
}

impl TokenServiceConfig {
    /// Cheap hashing parameters for unit tests
    ///
    /// Production-strength Argon2 settings make test suites that rotate
    /// tokens dozens of times unreasonably slow.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            hash_memory_kib: 8,
            hash_time_cost: 1,
            hash_parallelism: 1,
            ..Default::default()
        }
    }
}
