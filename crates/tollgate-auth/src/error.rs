//! Error types for the auth crate.

use thiserror::Error;
use tollgate_core::GrantParseError;
use tollgate_store::{ReplaceError, StoreError};
use tollgate_token::{KeyKind, TokenError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username must not be empty")]
    InvalidUsername,

    #[error("credential store failed: {0}")]
    Store(#[from] StoreError),

    #[error("failed to delete existing claims: {0}")]
    DeleteClaims(#[source] StoreError),

    #[error("failed to create claims: {0}")]
    CreateClaims(#[source] StoreError),

    #[error("malformed claim: {0}")]
    MalformedClaim(#[from] GrantParseError),

    #[error("no endpoints authorized for client")]
    NoEndpoints,

    #[error("private key is missing")]
    PrivateKeyMissing,

    #[error("secret hashing failed: {0}")]
    Hashing(String),

    #[error("token error: {0}")]
    Token(#[source] TokenError),
}

impl AuthError {
    /// Status string reported to callers.
    pub fn status(&self) -> &'static str {
        match self {
            AuthError::InvalidUsername => "INVALID_USERNAME",
            AuthError::Store(_) => "FAIL_IN_DB",
            AuthError::DeleteClaims(_) => "DELETE CLAIM FAIL",
            AuthError::CreateClaims(_) => "CREATE CLAIM FAIL",
            AuthError::MalformedClaim(_) => "MALFORMED CLAIM",
            AuthError::NoEndpoints => "NO ENDPOINTS",
            AuthError::PrivateKeyMissing => "PRIVATE KEY IS MISSING",
            AuthError::Hashing(_) => "HASH FAIL",
            AuthError::Token(_) => "TOKEN FAIL",
        }
    }
}

impl From<ReplaceError> for AuthError {
    fn from(e: ReplaceError) -> Self {
        match e {
            ReplaceError::Delete(inner) => AuthError::DeleteClaims(inner),
            ReplaceError::Create(inner) => AuthError::CreateClaims(inner),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::KeyUnavailable(KeyKind::Private) => AuthError::PrivateKeyMissing,
            TokenError::NoEndpoints => AuthError::NoEndpoints,
            other => AuthError::Token(other),
        }
    }
}
