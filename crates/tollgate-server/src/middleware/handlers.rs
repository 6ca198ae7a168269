use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::Path,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tollgate_auth::{AuthError, Exchange, RequestCheck, check_request};
use tollgate_token::VerifiedClaims;
use uuid::Uuid;

type JsonResponse = (StatusCode, Json<Value>);

pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "tollgate-server" }))
}

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub username: String,
}

pub async fn issue_credentials(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<CredentialRequest>,
) -> JsonResponse {
    match state.credentials.issue(&body.username).await {
        Ok(issued) => (
            StatusCode::OK,
            Json(json!({
                "auth": "OK",
                "username": issued.username,
                "CLIENT_ID": issued.client_id,
                "CLIENT_SECRET": issued.client_secret,
            })),
        ),
        Err(e) => (
            error_code(&e),
            Json(json!({ "auth": e.status(), "username": body.username })),
        ),
    }
}

pub async fn lookup_credentials(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> JsonResponse {
    match state.credentials.lookup(&username).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(json!({
                "username": record.username,
                "CLIENT_ID": record.client_id,
                "issued_at": record.timestamp,
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "auth": "NOT FOUND", "username": username })),
        ),
        Err(e) => (error_code(&e), Json(json!({ "auth": e.status(), "username": username }))),
    }
}

#[derive(Debug, Deserialize)]
pub struct ClaimsRequest {
    pub claims: Vec<String>,
}

pub async fn set_claims(
    Extension(state): Extension<Arc<AppState>>,
    Path(client_id): Path<String>,
    Json(body): Json<ClaimsRequest>,
) -> JsonResponse {
    let client_id = match known_client(&state, &client_id).await {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.authority.set_claims(client_id, body.claims.as_slice()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "OK" }))),
        Err(e) => (error_code(&e), Json(json!({ "status": e.status() }))),
    }
}

pub async fn get_claims(
    Extension(state): Extension<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> JsonResponse {
    let client_id = match known_client(&state, &client_id).await {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.authority.claims(client_id).await {
        Ok(grants) => {
            let claims: Vec<String> = grants.iter().map(ToString::to_string).collect();
            (StatusCode::OK, Json(json!({ "status": "OK", "claims": claims })))
        }
        Err(e) => (error_code(&e), Json(json!({ "status": e.status() }))),
    }
}

async fn known_client(state: &AppState, raw: &str) -> Result<Uuid, JsonResponse> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "CLIENT NOT FOUND" })),
        )
    };
    let client_id = Uuid::parse_str(raw).map_err(|_| not_found())?;
    match state.authority.verify_client_id(client_id).await {
        Ok(true) => Ok(client_id),
        Ok(false) => Err(not_found()),
        Err(e) => Err((error_code(&e), Json(json!({ "status": e.status() })))),
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
}

pub async fn token(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<TokenRequest>,
) -> JsonResponse {
    let exchange = state
        .issuer
        .exchange(&body.client_id, &body.client_secret)
        .await;
    let validation = exchange.status();
    match exchange {
        Exchange::Issued(token) => (
            StatusCode::OK,
            Json(json!({ "validation": validation, "token": token })),
        ),
        Exchange::Invalid => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "validation": validation })),
        ),
        Exchange::Failed(e) => (
            error_code(&e),
            Json(json!({ "validation": validation, "error": e.status() })),
        ),
    }
}

pub async fn check(Extension(state): Extension<Arc<AppState>>, headers: HeaderMap) -> JsonResponse {
    match check_request(&headers, &state.verifier) {
        RequestCheck::Ok(_) => (StatusCode::OK, Json(json!({ "response": "OK" }))),
        RequestCheck::TokenNotFound => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "response": "TOKEN_NOT_FOUND" })),
        ),
        RequestCheck::Rejected(classification) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "token": classification })),
        ),
    }
}

/// Claims of the caller's token; mounted behind `require_token`.
pub async fn claims(Extension(claims): Extension<VerifiedClaims>) -> Json<Value> {
    Json(Value::Object(claims.claim_map()))
}

fn error_code(e: &AuthError) -> StatusCode {
    match e {
        AuthError::InvalidUsername | AuthError::MalformedClaim(_) => StatusCode::BAD_REQUEST,
        AuthError::NoEndpoints => StatusCode::FORBIDDEN,
        AuthError::PrivateKeyMissing => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
