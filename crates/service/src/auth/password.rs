//! One-way, salted password hashing.

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;

use super::errors::AuthError;

pub const ARGON2_ALGORITHM: &str = "argon2";

pub trait PasswordEncoder: Send + Sync {
    /// Name stored next to the hash.
    fn algorithm(&self) -> &str;
    fn encode(&self, raw: &str) -> Result<String, AuthError>;
    /// `Ok(false)` on mismatch; `Err` only when `encoded` is unusable.
    fn matches(&self, raw: &str, encoded: &str) -> Result<bool, AuthError>;
}

/// Argon2id with a random salt per hash, stored as a PHC string.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordEncoder;

impl PasswordEncoder for Argon2PasswordEncoder {
    fn algorithm(&self) -> &str {
        ARGON2_ALGORITHM
    }

    fn encode(&self, raw: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn matches(&self, raw: &str, encoded: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(encoded).map_err(|e| AuthError::HashError(e.to_string()))?;
        match Argon2::default().verify_password(raw.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashError(e.to_string())),
        }
    }
}
