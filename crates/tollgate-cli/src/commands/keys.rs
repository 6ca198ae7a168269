//! Key management commands.
//!
//! `tollgate keys generate` - Generate a new RSA keypair.

use std::fs;
use std::path::PathBuf;
use tollgate_token::KeyMaterial;

/// Generate a new RSA keypair in PEM form.
pub fn generate(bits: usize, output: Option<PathBuf>) -> anyhow::Result<()> {
    let keys = KeyMaterial::generate(bits)?;
    let private_pem = keys.private_key_pem()?;
    let public_pem = keys.public_key_pem()?;

    if let Some(output_dir) = output {
        fs::create_dir_all(&output_dir)?;

        let private_path = output_dir.join("private.pem");
        let public_path = output_dir.join("public.pem");

        fs::write(&private_path, &private_pem)?;
        fs::write(&public_path, &public_pem)?;

        println!("✔ Generated {bits}-bit RSA keypair:");
        println!("  Private key: {}", private_path.display());
        println!("  Public key:  {}", public_path.display());
        println!();
        println!("⚠️  Keep your private key secure! Never commit it to version control.");
        println!();
        println!("Reference them from tollgate.toml:");
        println!("  [keys]");
        println!("  private_key_file = \"{}\"", private_path.display());
        println!("  public_key_file = \"{}\"", public_path.display());
    } else {
        println!("{private_pem}");
        println!("{public_pem}");
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}
