//! Client secret derivation and checking.
//!
//! A client secret is the base64 encoding of an Argon2id PHC string over
//! `username#clientId#timestamp`. Nothing about the secret is stored: the
//! plaintext is rebuilt from the credential record and checked against the
//! hash the client presents.

use crate::error::AuthError;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tollgate_core::config::SecretHashConfig;
use uuid::Uuid;

/// Plaintext a client secret is derived from.
pub fn secret_plaintext(username: &str, client_id: &Uuid, timestamp: i64) -> String {
    format!("{username}#{client_id}#{timestamp}")
}

pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl SecretHasher {
    pub fn new(config: &SecretHashConfig) -> Result<Self, AuthError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `plaintext` with a fresh salt and return the client-facing secret.
    pub fn derive(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();
        Ok(STANDARD.encode(phc))
    }

    /// Whether `secret` was derived from `plaintext`.
    ///
    /// Cost parameters are taken from the secret itself, so secrets minted
    /// under an older configuration keep verifying.
    pub fn verify(&self, plaintext: &str, secret: &str) -> bool {
        let Some(phc) = STANDARD
            .decode(secret.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
        else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(&phc) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Run [`SecretHasher::derive`] on the blocking thread pool.
pub(crate) async fn derive_blocking(
    hasher: Arc<SecretHasher>,
    plaintext: String,
) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hasher.derive(&plaintext))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// Run [`SecretHasher::verify`] on the blocking thread pool.
///
/// A panicked or cancelled check reads as a mismatch.
pub(crate) async fn verify_blocking(
    hasher: Arc<SecretHasher>,
    plaintext: String,
    secret: String,
) -> bool {
    match tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &secret)).await {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!(error = %e, "secret check task failed");
            false
        }
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}
