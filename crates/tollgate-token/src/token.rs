//! Token creation and verification.

use crate::claims::{CheckedClaims, ClaimCheck, TokenStatus};
use crate::error::TokenError;
use crate::keys::KeyMaterial;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, Header, Validation, decode, decode_header, encode};
use serde_json::{Map, Value};
use std::sync::Arc;
use tollgate_core::config::TokenConfig;
use tollgate_core::{Clock, Grant, SystemClock};

/// Mints RS256 access tokens.
///
/// The payload is `iat`, `nbf`, `exp`, the sealed issuer tag in `iss`, and
/// one `"<index>": "endpoint/method"` entry per grant.
pub struct TokenBuilder {
    keys: Arc<KeyMaterial>,
    issuer: String,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenBuilder {
    /// Create a new token builder with the given keys and settings.
    pub fn new(keys: Arc<KeyMaterial>, config: &TokenConfig) -> Self {
        Self {
            keys,
            issuer: config.issuer.clone(),
            ttl_secs: config.ttl_secs,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Mint a token carrying `grants`.
    pub fn mint(&self, grants: &[Grant]) -> Result<String, TokenError> {
        let encoding_key = self.keys.encoding_key()?;
        if grants.is_empty() {
            return Err(TokenError::NoEndpoints);
        }

        let now = self.clock.now();
        let expires_at = now.saturating_add(self.ttl_secs);
        let sealed_issuer = self.keys.private_encrypt(self.issuer.as_bytes())?;

        let mut payload = Map::new();
        payload.insert("iat".into(), Value::from(now));
        payload.insert("nbf".into(), Value::from(now));
        payload.insert("exp".into(), Value::from(expires_at));
        payload.insert("iss".into(), Value::from(STANDARD.encode(sealed_issuer)));
        for (index, grant) in grants.iter().enumerate() {
            payload.insert(index.to_string(), Value::from(grant.to_string()));
        }

        let token = encode(&Header::new(Algorithm::RS256), &payload, encoding_key)
            .map_err(|e| TokenError::TokenCreationFailed(e.to_string()))?;

        tracing::debug!(grants = grants.len(), exp = expires_at, "minted token");
        Ok(token)
    }
}

/// Verifier for access tokens.
pub struct TokenVerifier {
    keys: Arc<KeyMaterial>,
    issuer: String,
    leeway_secs: i64,
    clock: Arc<dyn Clock>,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a new token verifier with the given keys and settings.
    pub fn new(keys: Arc<KeyMaterial>, config: &TokenConfig) -> Self {
        // Signature only; registered claims are checked by `CheckedClaims`.
        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Self {
            keys,
            issuer: config.issuer.clone(),
            leeway_secs: config.leeway_secs,
            clock: Arc::new(SystemClock),
            validation,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Verify a token and classify it. Never fails: anything that cannot be
    /// parsed or verified is `Invalid`.
    pub fn verify(&self, token: &str) -> TokenStatus {
        match self.check(token) {
            Ok(checked) => {
                let status = checked.classify();
                tracing::debug!(classification = %status.classification(), "checked token");
                status
            }
            Err(e) => {
                tracing::debug!(error = %e, "token rejected");
                TokenStatus::Invalid
            }
        }
    }

    /// Verify the signature, recover the issuer and check every registered
    /// claim. Errors mean the token never got as far as claim checks.
    pub fn check(&self, token: &str) -> Result<CheckedClaims, TokenError> {
        let data = decode::<Map<String, Value>>(token, self.keys.decoding_key()?, &self.validation)?;
        let iss = self.recover_issuer(data.claims.get("iss"));
        Ok(CheckedClaims::check(
            data.claims,
            iss,
            self.clock.now(),
            self.leeway_secs,
        ))
    }

    fn recover_issuer(&self, value: Option<&Value>) -> ClaimCheck<String> {
        let recovered = value
            .and_then(Value::as_str)
            .and_then(|tag| STANDARD.decode(tag).ok())
            .and_then(|sealed| self.keys.public_decrypt(&sealed).ok())
            .and_then(|plain| String::from_utf8(plain).ok());

        match recovered {
            Some(issuer) if issuer == self.issuer => ClaimCheck::Valid(issuer),
            Some(issuer) => {
                tracing::debug!(%issuer, "token issued by a different issuer");
                ClaimCheck::Invalid
            }
            None => ClaimCheck::Invalid,
        }
    }
}

/// Decode a token's header and payload without verifying anything.
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let header = decode_header(token)?;
    let payload_segment = token
        .split('.')
        .nth(1)
        .ok_or_else(|| TokenError::VerificationFailed("missing payload segment".to_string()))?;
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_segment)
        .map_err(|e| TokenError::VerificationFailed(e.to_string()))?;
    let payload: Map<String, Value> = serde_json::from_slice(&payload_bytes)
        .map_err(|e| TokenError::VerificationFailed(e.to_string()))?;

    Ok(TokenInfo {
        header: serde_json::to_value(&header)
            .map_err(|e| TokenError::VerificationFailed(e.to_string()))?,
        payload,
    })
}

/// Information about a token (for inspection).
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub header: Value,
    pub payload: Map<String, Value>,
}
