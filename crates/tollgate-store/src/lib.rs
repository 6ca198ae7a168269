//! # tollgate-store
//!
//! Persistence for issued credentials and per-client claim sets.
//!
//! Two backends implement the same traits:
//! - [`MemoryStore`] for tests and throwaway servers
//! - [`SqliteStore`] backed by sqlx, with embedded migrations
//!
//! Both give the same guarantees: one live credential per username, and
//! claim replacement that either fully applies or leaves the previous set.

pub mod error;
pub mod memory;
pub mod records;
pub mod sqlite;

pub use error::{ReplaceError, StoreError};
pub use memory::MemoryStore;
pub use records::{ClaimRecord, CredentialRecord, Upsert};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use uuid::Uuid;

/// Storage for issued credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential that owns `client_id`.
    async fn find_by_client_id(
        &self,
        client_id: Uuid,
    ) -> Result<Option<CredentialRecord>, StoreError>;

    /// Look up the live credential of `username`.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<CredentialRecord>, StoreError>;

    /// Insert the credential, or overwrite the username's existing one.
    async fn upsert(&self, record: CredentialRecord) -> Result<Upsert, StoreError>;
}

/// Storage for per-client endpoint/method claims.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Every claim of `client_id`, in the order it was stored.
    async fn find_claims(&self, client_id: Uuid) -> Result<Vec<ClaimRecord>, StoreError>;

    /// Replace the whole claim set of `client_id`.
    async fn replace_claims(
        &self,
        client_id: Uuid,
        claims: Vec<ClaimRecord>,
    ) -> Result<(), ReplaceError>;
}

/// Claims must all belong to the client being replaced.
pub(crate) fn check_ownership(client_id: Uuid, claims: &[ClaimRecord]) -> Result<(), StoreError> {
    match claims.iter().find(|c| c.client_id != client_id) {
        Some(stray) => Err(StoreError::Constraint(format!(
            "claim {}/{} belongs to {}, not {}",
            stray.endpoint, stray.method, stray.client_id, client_id
        ))),
        None => Ok(()),
    }
}
