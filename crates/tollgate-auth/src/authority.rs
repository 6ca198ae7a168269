//! Per-client claim sets.

use crate::error::AuthError;
use std::sync::Arc;
use tollgate_core::Grant;
use tollgate_store::{ClaimRecord, ClaimStore, CredentialStore};
use uuid::Uuid;

/// Maps client ids to their authorized endpoint/method pairs.
pub struct ClaimAuthority {
    credentials: Arc<dyn CredentialStore>,
    claims: Arc<dyn ClaimStore>,
}

impl ClaimAuthority {
    pub fn new(credentials: Arc<dyn CredentialStore>, claims: Arc<dyn ClaimStore>) -> Self {
        Self {
            credentials,
            claims,
        }
    }

    /// Replace the claim set of `client_id` with `claims`, each in
    /// `endpoint/method` form.
    ///
    /// Every claim is parsed before the store is touched; on any failure the
    /// previous set stays in place.
    pub async fn set_claims<S: AsRef<str>>(
        &self,
        client_id: Uuid,
        claims: &[S],
    ) -> Result<(), AuthError> {
        let records = claims
            .iter()
            .map(|raw| {
                raw.as_ref()
                    .parse::<Grant>()
                    .map(|grant| ClaimRecord::new(client_id, &grant))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = records.len();
        self.claims
            .replace_claims(client_id, records)
            .await
            .inspect_err(|e| tracing::warn!(%client_id, error = %e, "claim replacement failed"))?;

        tracing::info!(%client_id, claims = count, "replaced claim set");
        Ok(())
    }

    /// Whether a credential with this client id exists.
    pub async fn verify_client_id(&self, client_id: Uuid) -> Result<bool, AuthError> {
        Ok(self.credentials.find_by_client_id(client_id).await?.is_some())
    }

    /// The claim set of `client_id` in stored order.
    pub async fn claims(&self, client_id: Uuid) -> Result<Vec<Grant>, AuthError> {
        Ok(self
            .claims
            .find_claims(client_id)
            .await?
            .iter()
            .map(ClaimRecord::grant)
            .collect())
    }
}
