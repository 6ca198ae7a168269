//! Credential issuance.

use crate::error::AuthError;
use crate::secret::{SecretHasher, derive_blocking, secret_plaintext};
use std::fmt;
use std::sync::Arc;
use tollgate_core::{Clock, SystemClock};
use tollgate_store::{CredentialRecord, CredentialStore, Upsert};
use uuid::Uuid;

/// A freshly issued client id and secret.
///
/// The secret exists only here; it cannot be recovered later.
#[derive(Clone)]
pub struct IssuedCredential {
    pub username: String,
    pub client_id: Uuid,
    pub client_secret: String,
    pub issued_at: i64,
    /// Client id this credential superseded, if the username had one.
    pub replaced: Option<Uuid>,
}

impl fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("replaced", &self.replaced)
            .finish()
    }
}

/// Issues client credentials, one live credential per username.
pub struct CredentialIssuer {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<SecretHasher>,
    clock: Arc<dyn Clock>,
}

impl CredentialIssuer {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<SecretHasher>) -> Self {
        Self {
            store,
            hasher,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Issue a new credential for `username`, superseding any previous one.
    pub async fn issue(&self, username: &str) -> Result<IssuedCredential, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::InvalidUsername);
        }

        let client_id = Uuid::new_v4();
        let issued_at = self.clock.now();
        let client_secret = derive_blocking(
            self.hasher.clone(),
            secret_plaintext(username, &client_id, issued_at),
        )
        .await?;

        let outcome = self
            .store
            .upsert(CredentialRecord {
                username: username.to_string(),
                client_id,
                timestamp: issued_at,
            })
            .await
            .inspect_err(|e| tracing::warn!(username, error = %e, "failed to store credential"))?;

        let replaced = match outcome {
            Upsert::Created => {
                tracing::info!(username, %client_id, "issued credential");
                None
            }
            Upsert::Replaced { previous } => {
                tracing::info!(username, %client_id, %previous, "reissued credential");
                Some(previous)
            }
        };

        Ok(IssuedCredential {
            username: username.to_string(),
            client_id,
            client_secret,
            issued_at,
            replaced,
        })
    }

    /// The live credential of `username`, without its secret.
    pub async fn lookup(&self, username: &str) -> Result<Option<CredentialRecord>, AuthError> {
        Ok(self.store.find_by_username(username).await?)
    }
}
