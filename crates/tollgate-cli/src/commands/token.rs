//! Token commands.
//!
//! `tollgate token mint` - Mint a token for a list of endpoint/method claims.
//! `tollgate token inspect` - Inspect a token's contents.
//! `tollgate token verify` - Verify a token and print its classification.

use super::read_arg;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tollgate_core::config::TokenConfig;
use tollgate_core::{Classification, Grant};
use tollgate_token::{KeyMaterial, TokenBuilder, TokenVerifier, inspect_token_unverified};

/// Resolve key material from either a PEM file path or PEM text.
fn resolve_private_key(key: Option<String>) -> anyhow::Result<KeyMaterial> {
    let key = key.context(
        "Private key not provided. Either pass --private-key <path> or set TOLLGATE_PRIVATE_KEY",
    )?;
    let pem = read_arg(&key)?;
    KeyMaterial::from_private_pem(&pem).context("Failed to parse private key. Expected RSA PEM")
}

fn resolve_public_key(key: Option<String>) -> anyhow::Result<KeyMaterial> {
    let key = key.context(
        "Public key not provided. Either pass --public-key <path> or set TOLLGATE_PUBLIC_KEY",
    )?;
    let pem = read_arg(&key)?;
    KeyMaterial::from_public_pem(&pem)
        .context("Failed to parse public key. Expected RSA PEM or certificate")
}

/// Mint a token carrying `claims`.
pub fn mint(
    private_key: Option<String>,
    config: TokenConfig,
    claims: Vec<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let keys = Arc::new(resolve_private_key(private_key)?);
    let grants = claims
        .iter()
        .map(|c| c.parse::<Grant>())
        .collect::<Result<Vec<_>, _>>()?;

    let token = TokenBuilder::new(keys, &config).mint(&grants)?;

    if let Some(output_path) = output {
        fs::write(&output_path, &token)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  Issuer: {}", config.issuer);
        println!("  Expires in: {}s", config.ttl_secs);
        for grant in &grants {
            println!("  Grant: {grant}");
        }
    } else {
        println!("{token}");
    }

    Ok(())
}

/// Inspect a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let info = inspect_token_unverified(&read_arg(&token)?)?;

    println!("Token Information:");
    println!("  Header: {}", info.header);
    println!();
    println!("{}", serde_json::to_string_pretty(&info.payload)?);
    println!();
    println!("⚠️  Not verified; the iss value is still sealed.");

    Ok(())
}

/// Verify a token and report its classification.
pub fn verify(
    public_key: Option<String>,
    config: TokenConfig,
    token: String,
) -> anyhow::Result<Classification> {
    let keys = Arc::new(resolve_public_key(public_key)?);
    let verifier = TokenVerifier::new(keys, &config);
    let token = read_arg(&token)?;

    let status = verifier.verify(&token);
    match status.claims() {
        Some(claims) => {
            println!("✔ Token is valid");
            println!();
            println!("{}", serde_json::to_string_pretty(&claims.claim_map())?);
        }
        None => println!("✖ Token is {}", status.classification()),
    }

    Ok(status.classification())
}
