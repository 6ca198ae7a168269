//! Client credential to access token exchange.

use crate::authority::ClaimAuthority;
use crate::error::AuthError;
use crate::secret::{SecretHasher, secret_plaintext, verify_blocking};
use std::sync::Arc;
use tollgate_store::CredentialStore;
use tollgate_token::TokenBuilder;
use uuid::Uuid;

/// Outcome of presenting a client id and secret.
#[derive(Debug)]
pub enum Exchange {
    /// Credentials checked out; carries the compact token.
    Issued(String),
    /// Unknown client id or wrong secret.
    Invalid,
    /// Credentials were fine but no token could be minted.
    Failed(AuthError),
}

impl Exchange {
    pub fn status(&self) -> &'static str {
        match self {
            Exchange::Issued(_) => "OK",
            Exchange::Invalid => "INVALID",
            Exchange::Failed(_) => "FAILED",
        }
    }
}

pub struct TokenIssuer {
    credentials: Arc<dyn CredentialStore>,
    authority: Arc<ClaimAuthority>,
    hasher: Arc<SecretHasher>,
    builder: TokenBuilder,
}

impl TokenIssuer {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        authority: Arc<ClaimAuthority>,
        hasher: Arc<SecretHasher>,
        builder: TokenBuilder,
    ) -> Self {
        Self {
            credentials,
            authority,
            hasher,
            builder,
        }
    }

    /// Whether `secret` is the current secret of `client_id`.
    ///
    /// Unknown ids, malformed ids and store failures all read as `false`.
    pub async fn verify_credential(&self, client_id: &str, secret: &str) -> bool {
        let Ok(client_id) = Uuid::parse_str(client_id.trim()) else {
            return false;
        };
        let record = match self.credentials.find_by_client_id(client_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(%client_id, error = %e, "credential lookup failed");
                return false;
            }
        };
        verify_blocking(
            self.hasher.clone(),
            secret_plaintext(&record.username, &record.client_id, record.timestamp),
            secret.to_string(),
        )
        .await
    }

    /// Mint a token carrying every claim of `client_id`.
    ///
    /// Does not check credentials; see [`TokenIssuer::exchange`].
    pub async fn issue_token(&self, client_id: Uuid) -> Result<String, AuthError> {
        let grants = self.authority.claims(client_id).await?;
        let token = self.builder.mint(&grants)?;
        tracing::info!(%client_id, grants = grants.len(), "issued token");
        Ok(token)
    }

    /// Verify the credentials, then issue a token.
    pub async fn exchange(&self, client_id: &str, secret: &str) -> Exchange {
        if !self.verify_credential(client_id, secret).await {
            tracing::debug!("token request with invalid credentials");
            return Exchange::Invalid;
        }
        let Ok(id) = Uuid::parse_str(client_id.trim()) else {
            return Exchange::Invalid;
        };
        match self.issue_token(id).await {
            Ok(token) => Exchange::Issued(token),
            Err(e) => {
                tracing::warn!(client_id = %id, error = %e, "token issuance failed");
                Exchange::Failed(e)
            }
        }
    }
}
