//! # tollgate-token
//!
//! RS256 access tokens for Tollgate.
//!
//! This crate provides functionality for:
//! - Loading RSA key material from PEM, PKCS#12 bundles and certificates
//! - Sealing the issuer identity with the private key (`iss` tag)
//! - Minting compact JWS tokens that carry a client's endpoint grants
//! - Verifying tokens and classifying them as valid, expired or invalid
//!
//! ## Token layout
//!
//! ```text
//! header  {"typ":"JWT","alg":"RS256"}
//! payload {"iat":..,"nbf":..,"exp":..,"iss":"<base64 sealed issuer>",
//!          "0":"orders/GET","1":"orders/POST"}
//! ```
//!
//! The `iss` value is the configured issuer string run through raw RSA with
//! the private key. Verifiers recover it with the public key and compare it
//! to their own configured issuer, independently of the JWS signature.

pub mod claims;
pub mod error;
pub mod keys;
pub mod token;

pub use claims::{CheckedClaims, ClaimCheck, TokenStatus, VerifiedClaims};
pub use error::{KeyKind, TokenError};
pub use keys::KeyMaterial;
pub use token::{TokenBuilder, TokenInfo, TokenVerifier, inspect_token_unverified};
