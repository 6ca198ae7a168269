//! Client secret commands.
//!
//! `tollgate secret check` - Check a client secret against its credential fields.

use tollgate_auth::{SecretHasher, secret_plaintext};
use uuid::Uuid;

/// Whether `secret` belongs to the given credential.
pub fn check(username: &str, client_id: Uuid, timestamp: i64, secret: &str) -> bool {
    SecretHasher::default().verify(&secret_plaintext(username, &client_id, timestamp), secret)
}
