//! Password hashing

use thiserror::Error;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct CredentialError(String);

/// `hash(secret) -> digest`, `verify(secret, digest) -> bool`
///
/// Implementations are CPU-bound; the registry calls them on the blocking pool.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, secret: &str) -> Result<String, CredentialError>;

    /// Malformed digests verify as `false`
    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// Argon2id with a random salt, stored as a PHC string
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, CredentialError> {
        use argon2::password_hash::SaltString;
        use argon2::password_hash::rand_core::OsRng;
        use argon2::{Argon2, PasswordHasher};
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| CredentialError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}
