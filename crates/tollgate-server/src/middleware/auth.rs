use crate::state::AppState;
use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tollgate_auth::{RequestCheck, check_request};

/// Header carrying the management token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Axum middleware requiring a valid bearer token.
///
/// On success the token's `VerifiedClaims` are inserted into the request
/// extensions for downstream handlers.
pub async fn require_token(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    match check_request(req.headers(), &state.verifier) {
        RequestCheck::Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        RequestCheck::TokenNotFound => Err(StatusCode::UNAUTHORIZED),
        RequestCheck::Rejected(classification) => {
            tracing::debug!(%classification, path = %req.uri().path(), "rejected bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Axum middleware guarding management routes with `server.admin_token`.
/// Open when no admin token is configured.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, StatusCode> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(expected) = state.cfg.server.admin_token.as_deref() {
        if !admin_token_matches(req.headers(), expected) {
            tracing::warn!(path = %req.uri().path(), "management request without a valid admin token");
            return Err(StatusCode::UNAUTHORIZED);
        }
    }
    Ok(next.run(req).await)
}

fn admin_token_matches(headers: &HeaderMap, expected: &str) -> bool {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}
