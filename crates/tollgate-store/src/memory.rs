//! In-memory store.

use crate::error::{ReplaceError, StoreError};
use crate::records::{ClaimRecord, CredentialRecord, Upsert};
use crate::{ClaimStore, CredentialStore, check_ownership};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Store held entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    /// Keyed by username.
    credentials: RwLock<HashMap<String, CredentialRecord>>,
    claims: RwLock<HashMap<Uuid, Vec<ClaimRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_client_id(
        &self,
        client_id: Uuid,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let credentials = self.credentials.read().map_err(|_| StoreError::LockError)?;
        Ok(credentials
            .values()
            .find(|r| r.client_id == client_id)
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let credentials = self.credentials.read().map_err(|_| StoreError::LockError)?;
        Ok(credentials.get(username).cloned())
    }

    async fn upsert(&self, record: CredentialRecord) -> Result<Upsert, StoreError> {
        let mut credentials = self.credentials.write().map_err(|_| StoreError::LockError)?;

        let taken = credentials
            .values()
            .any(|r| r.client_id == record.client_id && r.username != record.username);
        if taken {
            return Err(StoreError::Constraint(format!(
                "client id {} already issued",
                record.client_id
            )));
        }

        match credentials.insert(record.username.clone(), record) {
            Some(previous) => Ok(Upsert::Replaced {
                previous: previous.client_id,
            }),
            None => Ok(Upsert::Created),
        }
    }
}

#[async_trait]
impl ClaimStore for MemoryStore {
    async fn find_claims(&self, client_id: Uuid) -> Result<Vec<ClaimRecord>, StoreError> {
        let claims = self.claims.read().map_err(|_| StoreError::LockError)?;
        Ok(claims.get(&client_id).cloned().unwrap_or_default())
    }

    async fn replace_claims(
        &self,
        client_id: Uuid,
        claims: Vec<ClaimRecord>,
    ) -> Result<(), ReplaceError> {
        check_ownership(client_id, &claims).map_err(ReplaceError::Create)?;
        if let Some(bad) = claims.iter().find(|c| c.method.is_empty()) {
            return Err(ReplaceError::Create(StoreError::Constraint(format!(
                "empty method for endpoint {:?}",
                bad.endpoint
            ))));
        }

        let mut all = self
            .claims
            .write()
            .map_err(|_| ReplaceError::Delete(StoreError::LockError))?;
        if claims.is_empty() {
            all.remove(&client_id);
        } else {
            all.insert(client_id, claims);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(username: &str) -> CredentialRecord {
        CredentialRecord {
            username: username.to_string(),
            client_id: Uuid::new_v4(),
            timestamp: 1_700_000_000,
        }
    }

    fn claim(client_id: Uuid, endpoint: &str, method: &str) -> ClaimRecord {
        ClaimRecord {
            client_id,
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_username() {
        let store = MemoryStore::new();
        let first = credential("alice");
        let second = credential("alice");

        assert_eq!(store.upsert(first.clone()).await.unwrap(), Upsert::Created);
        assert_eq!(
            store.upsert(second.clone()).await.unwrap(),
            Upsert::Replaced {
                previous: first.client_id
            }
        );

        assert!(store.find_by_client_id(first.client_id).await.unwrap().is_none());
        assert_eq!(
            store.find_by_username("alice").await.unwrap(),
            Some(second.clone())
        );
        assert_eq!(
            store.find_by_client_id(second.client_id).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_client_id_is_unique() {
        let store = MemoryStore::new();
        let alice = credential("alice");
        let bob = CredentialRecord {
            username: "bob".to_string(),
            ..alice.clone()
        };

        store.upsert(alice).await.unwrap();
        assert!(matches!(
            store.upsert(bob).await,
            Err(StoreError::Constraint(_))
        ));
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_claims() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        store
            .replace_claims(id, vec![claim(id, "a", "GET"), claim(id, "b", "POST")])
            .await
            .unwrap();
        store
            .replace_claims(id, vec![claim(id, "c", "PUT")])
            .await
            .unwrap();

        assert_eq!(store.find_claims(id).await.unwrap(), vec![claim(id, "c", "PUT")]);
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_set() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .replace_claims(id, vec![claim(id, "a", "GET")])
            .await
            .unwrap();

        let err = store
            .replace_claims(id, vec![claim(id, "b", "POST"), claim(id, "c", "")])
            .await
            .unwrap_err();
        assert!(matches!(err, ReplaceError::Create(_)));

        let stray = store
            .replace_claims(id, vec![claim(Uuid::new_v4(), "d", "GET")])
            .await
            .unwrap_err();
        assert!(matches!(stray, ReplaceError::Create(_)));

        assert_eq!(store.find_claims(id).await.unwrap(), vec![claim(id, "a", "GET")]);
    }

    #[tokio::test]
    async fn test_unknown_client_has_no_claims() {
        let store = MemoryStore::new();
        assert!(store.find_claims(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
