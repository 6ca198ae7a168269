//! Error types for the token crate.

use std::fmt;
use thiserror::Error;

/// Which half of the key pair an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Private,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Public => f.write_str("public"),
            KeyKind::Private => f.write_str("private"),
        }
    }
}

/// Errors that can occur during key and token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// A required key was never loaded.
    #[error("{0} key is not loaded")]
    KeyUnavailable(KeyKind),

    /// Failed to generate keypair.
    #[error("failed to generate keypair: {0}")]
    KeyGenerationFailed(String),

    /// Failed to parse private key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// Failed to parse public key.
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    /// Failed to open a PKCS#12 bundle.
    #[error("failed to read PKCS#12 bundle: {0}")]
    InvalidPkcs12(String),

    /// Failed to parse an X.509 certificate.
    #[error("failed to parse certificate: {0}")]
    InvalidCertificate(String),

    /// Raw RSA operation failed.
    #[error("RSA operation failed: {0}")]
    Crypto(String),

    /// The client has no authorized endpoints.
    #[error("no endpoints authorized for client")]
    NoEndpoints,

    /// Failed to create token.
    #[error("failed to create token: {0}")]
    TokenCreationFailed(String),

    /// Failed to parse or verify token.
    #[error("token verification failed: {0}")]
    VerificationFailed(String),

    /// IO error (reading keys).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TokenError {
    /// Whether this is a missing-key failure rather than a malformed one.
    pub fn is_key_unavailable(&self) -> bool {
        matches!(self, TokenError::KeyUnavailable(_))
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        TokenError::VerificationFailed(e.to_string())
    }
}
