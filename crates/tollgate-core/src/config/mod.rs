//! Configuration types for Tollgate.
//!
//! Configuration is read once at startup from a TOML file and then patched
//! from the environment:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//! database_path = "data/tollgate.sqlite"
//!
//! [token]
//! issuer = "https://auth.example.com"
//! ttl_secs = 3600
//!
//! [keys]
//! private_key_file = "certs/private.pem"
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `TOLLGATE_ISSUER` | `token.issuer` |
//! | `TOLLGATE_TOKEN_TTL` | `token.ttl_secs` |
//! | `TOLLGATE_BIND` | `server.bind` |
//! | `TOLLGATE_DATABASE` | `server.database_path` |
//! | `TOLLGATE_ADMIN_TOKEN` | `server.admin_token` |

pub mod keys;
pub mod secret_hash;
pub mod server;
pub mod token;

pub use keys::KeysConfig;
pub use secret_hash::SecretHashConfig;
pub use server::ServerConfig;
pub use token::TokenConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TOLLGATE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "tollgate.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Complete Tollgate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TollgateConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub keys: KeysConfig,

    #[serde(default)]
    pub secret_hash: SecretHashConfig,
}

impl TollgateConfig {
    /// Parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `$TOLLGATE_CONFIG` (or `tollgate.toml`), falling back to
    /// defaults when the file does not exist, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        let mut cfg = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        cfg.apply_env(|name| std::env::var(name).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.token.validate()
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(issuer) = lookup("TOLLGATE_ISSUER") {
            self.token.issuer = issuer;
        }
        if let Some(ttl) = lookup("TOLLGATE_TOKEN_TTL") {
            self.token.ttl_secs = ttl.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "TOLLGATE_TOKEN_TTL",
                value: ttl.clone(),
            })?;
        }
        if let Some(bind) = lookup("TOLLGATE_BIND") {
            self.server.bind = bind;
        }
        if let Some(db) = lookup("TOLLGATE_DATABASE") {
            self.server.database_path = db;
        }
        if let Some(token) = lookup("TOLLGATE_ADMIN_TOKEN") {
            self.server.admin_token = Some(token);
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(p);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}
