use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tollgate_core::config::TokenConfig;
use tollgate_core::{Classification, TollgateConfig};
use uuid::Uuid;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "tollgate", version, about = "Tollgate operator CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// RSA key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Mint, inspect and verify tokens
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Client secret utilities
    Secret {
        #[command(subcommand)]
        cmd: SecretCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new RSA keypair (PKCS#8 private, SPKI public)
    Generate {
        /// Modulus size in bits
        #[arg(long, default_value_t = 2048)]
        bits: usize,

        /// Directory to write private.pem and public.pem into
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Issuer and lifetime settings; unset values come from tollgate.toml.
#[derive(clap::Args, Debug)]
struct TokenSettings {
    /// Issuer identity sealed into `iss`
    #[arg(long)]
    issuer: Option<String>,

    /// Token lifetime in seconds
    #[arg(long)]
    ttl: Option<i64>,

    /// Allowed clock skew for iat/nbf in seconds
    #[arg(long)]
    leeway: Option<i64>,
}

impl TokenSettings {
    fn resolve(self) -> anyhow::Result<TokenConfig> {
        let mut config = TollgateConfig::load()?.token;
        if let Some(issuer) = self.issuer {
            config.issuer = issuer;
        }
        if let Some(ttl) = self.ttl {
            config.ttl_secs = ttl;
        }
        if let Some(leeway) = self.leeway {
            config.leeway_secs = leeway;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a token for endpoint/method claims
    Mint {
        /// Private key PEM file or PEM text
        #[arg(long, env = "TOLLGATE_PRIVATE_KEY")]
        private_key: Option<String>,

        #[command(flatten)]
        settings: TokenSettings,

        /// Claim in endpoint/method form (repeatable)
        #[arg(long = "claim", required = true)]
        claims: Vec<String>,

        /// Write the token to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Decode a token without verifying it
    Inspect {
        /// Token text or a file containing it
        token: String,
    },

    /// Verify a token; exits non-zero unless it is valid
    Verify {
        /// Public key PEM file, PEM text or certificate
        #[arg(long, env = "TOLLGATE_PUBLIC_KEY")]
        public_key: Option<String>,

        #[command(flatten)]
        settings: TokenSettings,

        /// Token text or a file containing it
        token: String,
    },
}

#[derive(Subcommand, Debug)]
enum SecretCommand {
    /// Check a client secret against its credential fields
    Check {
        #[arg(long)]
        username: String,

        #[arg(long)]
        client_id: Uuid,

        /// Issuance timestamp (Unix seconds)
        #[arg(long)]
        timestamp: i64,

        /// The base64 client secret
        secret: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { bits, output } => commands::keys::generate(bits, output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Mint {
                private_key,
                settings,
                claims,
                output,
            } => commands::token::mint(private_key, settings.resolve()?, claims, output)?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
            TokenCommand::Verify {
                public_key,
                settings,
                token,
            } => {
                let classification =
                    commands::token::verify(public_key, settings.resolve()?, token)?;
                if classification != Classification::Valid {
                    std::process::exit(1);
                }
            }
        },

        Command::Secret { cmd } => match cmd {
            SecretCommand::Check {
                username,
                client_id,
                timestamp,
                secret,
            } => {
                if commands::secret::check(&username, client_id, timestamp, &secret) {
                    println!("✔ Secret matches {username} / {client_id}");
                } else {
                    println!("✖ Secret does not match");
                    std::process::exit(1);
                }
            }
        },
    }

    Ok(())
}
