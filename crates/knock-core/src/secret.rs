//! Shared-secret hashing and verification.
//!
//! The configured secret is stored as an Argon2 PHC string
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`). Verification parses the
//! stored hash and compares in constant time.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed secret hash: {0}")]
    MalformedHash(password_hash::Error),
    #[error("secret verification failed: {0}")]
    Backend(password_hash::Error),
}

/// Checks a presented key against the configured secret hash.
///
/// `Ok(false)` is a plain mismatch. `Err` means the comparison itself could
/// not be carried out and must never be read as either outcome.
pub trait SecretVerifier: Send + Sync {
    fn verify(&self, candidate: &str, secret_hash: &str) -> Result<bool, VerifyError>;
}

/// Argon2 verifier for PHC-formatted hashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Verifier;

impl SecretVerifier for Argon2Verifier {
    fn verify(&self, candidate: &str, secret_hash: &str) -> Result<bool, VerifyError> {
        let parsed = PasswordHash::new(secret_hash).map_err(VerifyError::MalformedHash)?;
        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(VerifyError::Backend(e)),
        }
    }
}

/// Hash `secret` with a fresh random salt, producing a PHC string.
pub fn hash_secret(secret: &str) -> Result<String, VerifyError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(VerifyError::Backend)
}

/// Check that `secret_hash` parses as a PHC string.
pub fn validate_hash(secret_hash: &str) -> Result<(), VerifyError> {
    PasswordHash::new(secret_hash)
        .map(|_| ())
        .map_err(VerifyError::MalformedHash)
}
