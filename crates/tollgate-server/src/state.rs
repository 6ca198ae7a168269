use anyhow::Context;
use std::sync::Arc;
use tollgate_auth::{ClaimAuthority, CredentialIssuer, SecretHasher, TokenIssuer};
use tollgate_core::TollgateConfig;
use tollgate_store::{ClaimStore, CredentialStore, SqliteStore};
use tollgate_token::{KeyMaterial, TokenBuilder, TokenVerifier};

/// Shared application state.
pub struct AppState {
    pub cfg: TollgateConfig,
    pub credentials: CredentialIssuer,
    pub authority: Arc<ClaimAuthority>,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
}

impl AppState {
    /// Load keys from configuration and open the SQLite store.
    pub async fn init(cfg: &TollgateConfig) -> anyhow::Result<Self> {
        let keys = KeyMaterial::from_config(&cfg.keys).context("failed to load key material")?;
        if !keys.has_public() {
            tracing::warn!("no key material configured; every token will be rejected");
        } else if !keys.has_private() {
            tracing::warn!("no private key configured; this server can verify but not issue tokens");
        }

        let store = SqliteStore::open(&cfg.server.database_path)
            .await
            .with_context(|| format!("failed to open {}", cfg.server.database_path))?;

        Self::build(cfg, Arc::new(keys), Arc::new(store))
    }

    /// Wire the components over an arbitrary store.
    pub fn build<S>(cfg: &TollgateConfig, keys: Arc<KeyMaterial>, store: Arc<S>) -> anyhow::Result<Self>
    where
        S: CredentialStore + ClaimStore + 'static,
    {
        let hasher = Arc::new(SecretHasher::new(&cfg.secret_hash).context("invalid [secret_hash] settings")?);
        let authority = Arc::new(ClaimAuthority::new(store.clone(), store.clone()));

        Ok(Self {
            cfg: cfg.clone(),
            credentials: CredentialIssuer::new(store.clone(), hasher.clone()),
            issuer: TokenIssuer::new(
                store,
                authority.clone(),
                hasher,
                TokenBuilder::new(keys.clone(), &cfg.token),
            ),
            verifier: TokenVerifier::new(keys, &cfg.token),
            authority,
        })
    }
}
