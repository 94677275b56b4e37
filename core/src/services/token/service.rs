//! Access token issuing plus refresh secret generation and hashing.

use argon2::password_hash::rand_core::OsRng as SaltRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm as Argon2Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, JWT_AUDIENCE, JWT_ISSUER};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Number of random bytes in a refresh token secret (256 bits)
const REFRESH_SECRET_BYTES: usize = 32;

/// Length of the non-secret lookup fingerprint, in hex characters
const FINGERPRINT_HEX_LEN: usize = 16;

/// Stateless signer/verifier of access tokens and refresh secret tooling
///
/// Holds no storage; the ledger and session state live behind the
/// repository traits. Refresh secrets are hashed with Argon2id so a leaked
/// ledger cannot be brute-forced back into live secrets; the SHA-256
/// fingerprint exists only to narrow the verification scan and is never
/// authoritative.
pub struct TokenService {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    hasher: Argon2<'static>,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or an error if the Argon2 parameters are invalid
    pub fn new(config: TokenServiceConfig) -> Result<Self, DomainError> {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_audience(&[JWT_AUDIENCE]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let params = Params::new(
            config.hash_memory_kib,
            config.hash_time_cost,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| DomainError::Internal {
            message: format!("Invalid secret hash parameters: {}", e),
        })?;
        let hasher = Argon2::new(Argon2Algorithm::Argon2id, Version::V0x13, params);

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            hasher,
        })
    }

    /// Access token lifetime in seconds
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.config.access_token_ttl_seconds
    }

    /// Issues a signed access token bound to a user, session, and role
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The encoded JWT
    /// * `Err(DomainError)` - Token generation failed
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        role: Option<String>,
    ) -> Result<String, DomainError> {
        let claims = Claims::new_access_token(
            user_id,
            session_id,
            role,
            self.config.access_token_ttl_seconds,
        );
        let header = Header::new(self.config.algorithm);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Verifies an access token and returns the claims
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The decoded claims if valid
    /// * `Err(DomainError)` - Token is invalid, expired, or malformed
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        DomainError::Token(TokenError::TokenExpired)
                    }
                    jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                        DomainError::Token(TokenError::TokenNotYetValid)
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        DomainError::Token(TokenError::InvalidSignature)
                    }
                    _ => DomainError::Token(TokenError::InvalidTokenFormat),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Generates a fresh refresh token secret
    ///
    /// 256 bits from the OS RNG, URL-safe base64 without padding. The raw
    /// secret exists only in the response to the client; callers persist
    /// the hash and fingerprint.
    pub fn generate_refresh_secret(&self) -> String {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hashes a refresh secret for storage
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - PHC-format Argon2id hash with embedded salt
    /// * `Err(DomainError)` - Hashing failed
    pub fn hash_refresh_secret(&self, secret: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut SaltRng);
        self.hasher
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Verifies a presented secret against a stored hash
    ///
    /// The comparison inside the Argon2 verify is constant-time; a mangled
    /// stored hash verifies as false rather than erroring.
    pub fn verify_refresh_secret(&self, secret: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .hasher
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Non-secret lookup fingerprint of a secret
    ///
    /// Truncated SHA-256, usable as an indexed first-pass filter over the
    /// ledger. Matching fingerprints still require the Argon2 verify.
    pub fn fingerprint(&self, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..FINGERPRINT_HEX_LEN].to_string()
    }
}
