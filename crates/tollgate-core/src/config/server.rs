//! HTTP server settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path to the SQLite file holding credentials and claims.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Shared secret required in `x-admin-token` on management routes.
    /// Unset means management routes are open.
    #[serde(default)]
    pub admin_token: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_database_path() -> String {
    "data/tollgate.sqlite".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database_path: default_database_path(),
            admin_token: None,
        }
    }
}
