//! # tollgate-core
//!
//! Types shared by every Tollgate crate:
//!
//! - [`Grant`]: one authorized `endpoint/method` pair
//! - [`Classification`]: the wire verdict for a presented token
//! - [`Clock`]: the time source injected into issuers and verifiers
//! - [`config`]: TOML + environment configuration

pub mod clock;
pub mod config;
pub mod grant;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TollgateConfig;
pub use grant::{Grant, GrantParseError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict for a presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Valid,
    Expired,
    Invalid,
}

impl Classification {
    /// Wire form used in JSON bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Valid => "VALID",
            Classification::Expired => "EXPIRED",
            Classification::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
