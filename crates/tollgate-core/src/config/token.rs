//! Token issuance and validation settings.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Longest accepted token lifetime (ten years).
pub const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Largest accepted clock skew (one day).
pub const MAX_LEEWAY_SECS: i64 = 24 * 60 * 60;

/// Settings for minting and checking access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Issuer identity embedded (encrypted) in every token's `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Lifetime of a minted token in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,

    /// Clock skew tolerated for `iat` and `nbf`, in seconds. `exp` is strict.
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: i64,
}

fn default_issuer() -> String {
    "tollgate".to_string()
}

fn default_ttl_secs() -> i64 {
    3600
}

fn default_leeway_secs() -> i64 {
    60
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            ttl_secs: default_ttl_secs(),
            leeway_secs: default_leeway_secs(),
        }
    }
}

impl TokenConfig {
    /// Reject lifetimes and leeways that are negative or absurdly large.
    ///
    /// `ttl_secs` must lie in `1..=MAX_TTL_SECS` and `leeway_secs` in
    /// `0..=MAX_LEEWAY_SECS`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TTL_SECS).contains(&self.ttl_secs) {
            return Err(ConfigError::OutOfRange {
                name: "token.ttl_secs",
                value: self.ttl_secs,
                min: 1,
                max: MAX_TTL_SECS,
            });
        }
        if !(0..=MAX_LEEWAY_SECS).contains(&self.leeway_secs) {
            return Err(ConfigError::OutOfRange {
                name: "token.leeway_secs",
                value: self.leeway_secs,
                min: 0,
                max: MAX_LEEWAY_SECS,
            });
        }
        Ok(())
    }
}
