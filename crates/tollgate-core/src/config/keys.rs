//! RSA key source configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the deployment's RSA key material comes from.
///
/// Sources are applied in order: public PEM, private PEM, PKCS#12 bundle
/// (replaces both keys), certificate (replaces the public key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Environment variable containing the public key PEM.
    #[serde(default)]
    pub public_key_env: Option<String>,

    /// Path to the public key PEM file.
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,

    /// Environment variable containing the private key PEM.
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// Path to the private key PEM file.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,

    /// Path to a PKCS#12 bundle holding the private key.
    #[serde(default)]
    pub pkcs12_file: Option<PathBuf>,

    /// Environment variable holding the PKCS#12 passphrase.
    #[serde(default = "default_pkcs12_passphrase_env")]
    pub pkcs12_passphrase_env: String,

    /// Path to an X.509 certificate (PEM or DER) whose key verifies tokens.
    #[serde(default)]
    pub certificate_file: Option<PathBuf>,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            public_key_env: None,
            public_key_file: None,
            private_key_env: None,
            private_key_file: None,
            pkcs12_file: None,
            pkcs12_passphrase_env: default_pkcs12_passphrase_env(),
            certificate_file: None,
        }
    }
}

fn default_pkcs12_passphrase_env() -> String {
    "TOLLGATE_CERT_SECRET".to_string()
}

impl KeysConfig {
    /// Resolve the public key PEM from environment or file.
    pub fn resolve_public_pem(&self) -> Result<Option<String>, std::io::Error> {
        resolve_pem(self.public_key_env.as_deref(), self.public_key_file.as_ref())
    }

    /// Resolve the private key PEM from environment or file.
    pub fn resolve_private_pem(&self) -> Result<Option<String>, std::io::Error> {
        resolve_pem(
            self.private_key_env.as_deref(),
            self.private_key_file.as_ref(),
        )
    }

    /// PKCS#12 passphrase; an unset variable means an empty passphrase.
    pub fn resolve_pkcs12_passphrase(&self) -> String {
        std::env::var(&self.pkcs12_passphrase_env).unwrap_or_default()
    }

    /// Whether any source is configured at all.
    pub fn is_empty(&self) -> bool {
        self.public_key_env.is_none()
            && self.public_key_file.is_none()
            && self.private_key_env.is_none()
            && self.private_key_file.is_none()
            && self.pkcs12_file.is_none()
            && self.certificate_file.is_none()
    }
}

fn resolve_pem(
    env_var: Option<&str>,
    path: Option<&PathBuf>,
) -> Result<Option<String>, std::io::Error> {
    // Environment first
    if let Some(env_var) = env_var {
        if let Ok(pem) = std::env::var(env_var) {
            return Ok(Some(pem));
        }
    }

    if let Some(path) = path {
        let pem = std::fs::read_to_string(path)?;
        return Ok(Some(pem));
    }

    Ok(None)
}
