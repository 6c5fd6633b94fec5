//! astra-creds CLI - fetch client credentials from Google Cloud Secret Manager
//!
//! Reads the `client_id` / `secret` pair stored in the latest version of a
//! secret, verifies its CRC32C checksum and prints the result. The secret is
//! masked unless `--show-token` is given.

mod output;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use creds_core::{CredentialStore, PopulateOutcome, SecretManagerClient, Settings};

/// astra-creds - checksum-verified client credentials from Secret Manager
#[derive(Parser, Debug)]
#[command(name = "astra-creds")]
#[command(version)]
#[command(about = "Fetch client credentials from Google Cloud Secret Manager")]
struct Args {
    /// Google Cloud project holding the secret
    #[arg(long, env = "ASTRA_PROJECT_ID")]
    project_id: Option<String>,

    /// Secret holding the client credentials
    #[arg(long, env = "ASTRA_SECRET_ID")]
    secret_id: Option<String>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Secret Manager API endpoint override
    #[arg(long)]
    endpoint: Option<String>,

    /// Print the secret in clear text
    #[arg(long)]
    show_token: bool,

    /// Print JSON instead of plain text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut settings = Settings::load(args.config.as_deref())
        .map_err(|e| format!("Failed to load settings: {}", e))?;

    if args.project_id.is_some() {
        settings.project_id = args.project_id;
    }
    if args.secret_id.is_some() {
        settings.secret_id = args.secret_id;
    }
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = endpoint;
        settings.validate()?;
    }

    let client = SecretManagerClient::from_settings(&settings)
        .map_err(|e| format!("Failed to create Secret Manager client: {}", e))?;
    info!("Using Secret Manager at {}", client.endpoint());

    let store = CredentialStore::new(Arc::new(client));

    match store.populate_from_settings(&settings).await? {
        PopulateOutcome::Populated => {}
        PopulateOutcome::NotConfigured => {
            return Err("Project id and secret id are required (--project-id / --secret-id)".into());
        }
    }

    let credentials = store
        .credentials()
        .await
        .ok_or("Credential store is empty after populate")?;

    println!(
        "{}",
        output::render(&credentials, args.show_token, args.json)?
    );

    Ok(())
}
