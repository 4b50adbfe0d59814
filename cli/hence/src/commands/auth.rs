//! `hence auth` — device flow login, API key save, or credential check

use std::io::Write;

use anyhow::Result;
use clap::Args;
use hence_auth::{CredentialStore, HTTP_TIMEOUT, Settings, device};

#[derive(Args)]
pub struct AuthArgs {
    /// Static API key to save for CI/CD use (skips the device flow)
    pub token: Option<String>,

    /// Verify that credentials exist without touching the network
    #[arg(long, conflicts_with = "token")]
    pub check: bool,
}

pub async fn run(args: AuthArgs, settings: Settings) -> Result<()> {
    let store = CredentialStore::new(settings.config_dir.clone());

    if args.check {
        return check(&store).await;
    }

    if let Some(token) = args.token {
        store.save_legacy_token(&token).await?;
        println!("Authenticated successfully. API key saved to ~/.hence/token");
        return Ok(());
    }

    device_flow(&settings, &store).await
}

async fn check(store: &CredentialStore) -> Result<()> {
    if store.load_credentials().await.is_some() {
        println!("Credentials found (OAuth device flow).");
        return Ok(());
    }
    let token = store.load_legacy_token().await?;
    let preview: String = token.chars().take(8).collect();
    println!("API key found: {preview}...");
    Ok(())
}

async fn device_flow(settings: &Settings, store: &CredentialStore) -> Result<()> {
    let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let session = device::start_session(&client, settings).await?;

    println!();
    println!("To authenticate, open this URL in your browser and enter the code:");
    println!();
    println!("If you're not already logged in, you'll be prompted to sign in first.");
    println!();
    println!("  URL:   {}", session.verification_uri);
    println!("  Code:  {}", session.user_code);
    println!();
    print!("Waiting for authorization...");
    std::io::stdout().flush()?;

    let result = device::poll_until_authorized(&client, settings, store, &session, || {
        print!(".");
        let _ = std::io::stdout().flush();
    })
    .await;

    match result {
        Ok(()) => {
            println!(" done!");
            println!("Authenticated successfully. Credentials saved to ~/.hence/credentials");
            Ok(())
        }
        Err(e) => {
            println!();
            Err(e.into())
        }
    }
}
