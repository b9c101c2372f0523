use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chirp_types::PasswordHash;

use crate::error::CryptoError;

/// Salted, adaptive password hashing.
///
/// Uses Argon2id with the library's default (fixed) cost parameters. Every
/// call to [`hash`](Self::hash) draws a fresh random salt, so hashing the same
/// password twice yields different encodings. Plaintext passwords are only
/// borrowed and are never stored or logged.
pub struct CredentialVault {
    argon2: Argon2<'static>,
}

impl CredentialVault {
    /// Create a vault with the fixed default cost.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a plaintext password for storage.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, CryptoError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?
            .to_string();
        Ok(PasswordHash::new(encoded))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch. Returns `Err` only when `hash` is not a
    /// well-formed encoded hash.
    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, CryptoError> {
        let parsed = password_hash::PasswordHash::new(hash.as_str())
            .map_err(|e| CryptoError::MalformedHash(e.to_string()))?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CryptoError::MalformedHash(e.to_string())),
        }
    }

    /// Run a verification whose result is discarded.
    ///
    /// Used when the account being authenticated does not exist, so that the
    /// response time does not reveal whether an email is registered.
    pub fn verify_decoy(&self, plaintext: &str) {
        static DECOY: OnceLock<Option<PasswordHash>> = OnceLock::new();
        let decoy = DECOY.get_or_init(|| CredentialVault::new().hash("decoy-password").ok());
        if let Some(hash) = decoy {
            let _ = self.verify(plaintext, hash);
        }
    }
}

impl Default for CredentialVault {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("algorithm", &"argon2id")
            .finish()
    }
}
