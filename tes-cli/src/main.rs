use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tes_common::TesClient;
use tes_protocol::CredentialResponse;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tes-cli")]
#[command(about = "Fetch AWS credentials from the local token exchange service")]
struct Args {
    #[arg(long, default_value = tes_common::TES_SOCKET_PATH)]
    socket_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    info!("Requesting credentials from {:?}", args.socket_path);
    let client = TesClient::with_socket_path(&args.socket_path);
    let credentials = client
        .fetch_formatted_credentials()
        .await
        .context("could not fetch credentials from the token exchange service")?;

    for field in credentials.missing_fields() {
        warn!("response did not contain {}", field);
    }
    if let Some(expiration) = credentials.expiration_time() {
        if expiration <= chrono::Utc::now() {
            warn!("credentials expired at {}", expiration.to_rfc3339());
        }
    }

    print_credentials(&credentials);
    println!();
    println!("=== Environment Variable Format ===");
    println!();
    print!("{}", format_env_exports(&credentials));

    Ok(())
}

fn print_credentials(credentials: &CredentialResponse) {
    println!("=== AWS Credentials from TES Service ===");
    println!();

    if let Some(access_key) = &credentials.access_key_id {
        println!("Access Key ID:     {}", access_key);
    }
    if let Some(secret_key) = &credentials.secret_access_key {
        println!("Secret Access Key: {}", secret_key);
    }
    if let Some(token) = &credentials.session_token {
        // Tokens run to a couple of thousand characters; show the head only.
        let head: String = token.chars().take(40).collect();
        println!("Session Token:     {}...(truncated)", head);
    }
    if let Some(expiration) = &credentials.expiration {
        println!("Expiration:        {}", expiration);
    }
}

fn format_env_exports(credentials: &CredentialResponse) -> String {
    format!(
        "export AWS_ACCESS_KEY_ID=\"{}\"\nexport AWS_SECRET_ACCESS_KEY=\"{}\"\nexport AWS_SESSION_TOKEN=\"{}\"\n",
        credentials.access_key_id.as_deref().unwrap_or(""),
        credentials.secret_access_key.as_deref().unwrap_or(""),
        credentials.session_token.as_deref().unwrap_or(""),
    )
}
