use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use vault_transit_client::{
    config::load_config,
    demo::{self, DemoOptions, DEFAULT_MESSAGE},
    observability::{init_logging, log_config_info},
    secrets::{SecretPath, TransitKeyName, VaultSecretClient},
    APP_NAME, VERSION,
};

#[derive(Parser)]
#[command(name = "vault-transit-demo")]
#[command(about = "Read a Vault KV secret and round-trip a message through transit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the secret, then run the transit round trip (default)
    Run {
        #[command(flatten)]
        secret: SecretArgs,
        #[command(flatten)]
        transit: TransitArgs,
    },

    /// Read one field of a KV secret
    Secret {
        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Provision a transit key and round-trip a message through it
    Transit {
        #[command(flatten)]
        transit: TransitArgs,
    },
}

#[derive(clap::Args, Clone)]
struct SecretArgs {
    /// Secret location as mount/path#field
    /// [default: <kv_mount>/team-a/github#github.oauth2.key]
    #[arg(long)]
    path: Option<SecretPath>,

    /// Print the secret value instead of its length
    #[arg(long)]
    reveal: bool,
}

#[derive(clap::Args, Clone)]
struct TransitArgs {
    /// Transit key name (defaults to the configured key)
    #[arg(long)]
    key: Option<TransitKeyName>,

    /// Message to encrypt
    #[arg(long, default_value = DEFAULT_MESSAGE)]
    message: String,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            secret: SecretArgs { path: None, reveal: false },
            transit: TransitArgs { key: None, message: DEFAULT_MESSAGE.to_string() },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    if cli.verbose && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Vault transit demo");
    log_config_info(&config);

    let client = VaultSecretClient::new(&config.vault)?;
    let defaults = DemoOptions::from_config(&config.vault)?;

    let result = match cli.command.unwrap_or_default() {
        Commands::Run { secret, transit } => {
            let options = DemoOptions {
                secret_path: secret.path.unwrap_or(defaults.secret_path),
                transit_key: transit.key.unwrap_or(defaults.transit_key),
                message: transit.message,
                reveal: secret.reveal,
            };
            demo::run(&client, &options).await.map(|_| ())
        }
        Commands::Secret { secret } => {
            let path = secret.path.unwrap_or(defaults.secret_path);
            demo::read_secret(&client, &path, secret.reveal).await.map(|_| ())
        }
        Commands::Transit { transit } => {
            let key = transit.key.unwrap_or(defaults.transit_key);
            demo::transit_round_trip(&client, &key, &transit.message).await.map(|_| ())
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Demo failed");
        return Err(e.into());
    }

    info!("Demo finished");
    Ok(())
}
