//! Bearer token extraction and request checks.

use http::HeaderMap;
use http::header::AUTHORIZATION;
use tollgate_core::Classification;
use tollgate_token::{TokenStatus, TokenVerifier, VerifiedClaims};

/// Extract the bearer token from the `Authorization` header.
///
/// The value must start with `Bearer` (case-sensitive); whatever follows,
/// trimmed, is the token. Missing, non-bearer or empty yields `None`.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim_start().strip_prefix("Bearer")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Outcome of checking a request's bearer token.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestCheck {
    Ok(VerifiedClaims),
    TokenNotFound,
    /// The token was present but `Expired` or `Invalid`.
    Rejected(Classification),
}

/// Check the bearer token on a request. The verifier is not consulted when
/// no token is present.
pub fn check_request(headers: &HeaderMap, verifier: &TokenVerifier) -> RequestCheck {
    let Some(token) = extract_bearer(headers) else {
        return RequestCheck::TokenNotFound;
    };
    match verifier.verify(token) {
        TokenStatus::Valid(claims) => RequestCheck::Ok(claims),
        status => RequestCheck::Rejected(status.classification()),
    }
}
