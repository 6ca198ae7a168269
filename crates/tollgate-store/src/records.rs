//! Row types shared by every backend.

use serde::{Deserialize, Serialize};
use tollgate_core::Grant;
use uuid::Uuid;

/// The live credential of one username.
///
/// The secret is never stored; it is recomputed from these three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    pub client_id: Uuid,
    /// Issuance time, Unix seconds.
    pub timestamp: i64,
}

/// One authorized endpoint/method pair of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub client_id: Uuid,
    pub endpoint: String,
    pub method: String,
}

impl ClaimRecord {
    pub fn new(client_id: Uuid, grant: &Grant) -> Self {
        Self {
            client_id,
            endpoint: grant.endpoint.clone(),
            method: grant.method.clone(),
        }
    }

    pub fn grant(&self) -> Grant {
        Grant::new(&self.endpoint, &self.method)
    }
}

/// What an upsert did to the username's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    /// The username already had a credential; `previous` is its old client id.
    Replaced { previous: Uuid },
}
