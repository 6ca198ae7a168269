//! # tollgate-auth
//!
//! The credential lifecycle on top of `tollgate-token` and `tollgate-store`:
//!
//! - [`CredentialIssuer`]: client id + secret per username
//! - [`ClaimAuthority`]: per-client endpoint/method allow-lists
//! - [`TokenIssuer`]: credential check and token minting
//! - [`bearer`]: `Authorization: Bearer` extraction and request checks

pub mod authority;
pub mod bearer;
pub mod credentials;
pub mod error;
pub mod issuer;
pub mod secret;

pub use authority::ClaimAuthority;
pub use bearer::{RequestCheck, check_request, extract_bearer};
pub use credentials::{CredentialIssuer, IssuedCredential};
pub use error::AuthError;
pub use issuer::{Exchange, TokenIssuer};
pub use secret::{SecretHasher, secret_plaintext};
