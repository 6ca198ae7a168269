//! Endpoint/method authorization pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One permitted `(endpoint, method)` pair.
///
/// The textual form is `endpoint/method`, split at the *last* `/`, so the
/// endpoint itself may contain slashes (`v1/orders/GET`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub endpoint: String,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantParseError {
    #[error("claim '{0}' has no '/' separating endpoint and method")]
    MissingSeparator(String),

    #[error("claim '{0}' has an empty method")]
    EmptyMethod(String),
}

impl Grant {
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
        }
    }

    /// Whether this grant covers the given endpoint and method.
    pub fn matches(&self, endpoint: &str, method: &str) -> bool {
        self.endpoint == endpoint && self.method == method
    }
}

impl FromStr for Grant {
    type Err = GrantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (endpoint, method) = s
            .rsplit_once('/')
            .ok_or_else(|| GrantParseError::MissingSeparator(s.to_string()))?;
        if method.is_empty() {
            return Err(GrantParseError::EmptyMethod(s.to_string()));
        }
        Ok(Self::new(endpoint, method))
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.endpoint, self.method)
    }
}
