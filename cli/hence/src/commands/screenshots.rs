//! `hence screenshots` — manage the screenshot set of an existing project

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use hence_api::{ApiClient, FilePart};
use hence_auth::Settings;
use serde_json::{Value, json};

#[derive(Args)]
pub struct ScreenshotsArgs {
    /// UUID of the project
    pub project_id: String,

    #[command(subcommand)]
    pub action: ScreenshotAction,
}

#[derive(Subcommand)]
pub enum ScreenshotAction {
    /// List all screenshots
    List,
    /// Add a screenshot
    Add {
        /// Path to image file
        #[arg(long)]
        file: PathBuf,
        /// Caption text
        #[arg(long, default_value = "")]
        caption: String,
    },
    /// Update a screenshot's image or caption
    Update {
        /// UUID of the screenshot
        screenshot_id: String,
        /// New image file
        #[arg(long)]
        file: Option<PathBuf>,
        /// New caption text
        #[arg(long)]
        caption: Option<String>,
    },
    /// Remove a screenshot
    Remove {
        /// UUID of the screenshot
        screenshot_id: String,
    },
    /// Reorder screenshots
    Reorder {
        /// Screenshot UUIDs in desired order
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub async fn run(args: ScreenshotsArgs, settings: Settings) -> Result<()> {
    let client = ApiClient::new(settings)?;
    let base = format!("/api/projects/{}/screenshots", args.project_id);

    match args.action {
        ScreenshotAction::List => list(&client, &base).await,
        ScreenshotAction::Add { file, caption } => add(&client, &base, file, caption).await,
        ScreenshotAction::Update {
            screenshot_id,
            file,
            caption,
        } => update(&client, &base, &screenshot_id, file, caption).await,
        ScreenshotAction::Remove { screenshot_id } => {
            remove(&client, &base, &screenshot_id).await
        }
        ScreenshotAction::Reorder { ids } => reorder(&client, &base, ids).await,
    }
}

async fn list(client: &ApiClient, base: &str) -> Result<()> {
    let response = client.get(base).await?;
    let screenshots = response["data"].as_array().cloned().unwrap_or_default();
    if screenshots.is_empty() {
        println!("No screenshots found.");
        return Ok(());
    }
    for s in &screenshots {
        println!(
            "{}  pos={}  \"{}\"  {}",
            field_str(s, "id"),
            s["position"],
            field_str(s, "caption"),
            field_str(s, "url"),
        );
    }
    Ok(())
}

async fn add(client: &ApiClient, base: &str, file: PathBuf, caption: String) -> Result<()> {
    let fields = if caption.is_empty() {
        vec![]
    } else {
        vec![("caption".to_string(), caption)]
    };
    let response = client
        .post_multipart(base, fields, vec![FilePart::new("file", file)])
        .await?;
    let s = &response["data"];
    println!(
        "Added screenshot: {}  pos={}  \"{}\"",
        field_str(s, "id"),
        s["position"],
        field_str(s, "caption"),
    );
    Ok(())
}

async fn update(
    client: &ApiClient,
    base: &str,
    screenshot_id: &str,
    file: Option<PathBuf>,
    caption: Option<String>,
) -> Result<()> {
    if file.is_none() && caption.is_none() {
        bail!("Provide at least --file or --caption.");
    }
    let fields = caption
        .map(|c| vec![("caption".to_string(), c)])
        .unwrap_or_default();
    let files = file
        .map(|f| vec![FilePart::new("file", f)])
        .unwrap_or_default();
    let response = client
        .patch_multipart(&format!("{base}/{screenshot_id}"), fields, files)
        .await?;
    let s = &response["data"];
    println!(
        "Updated: {}  pos={}  \"{}\"",
        field_str(s, "id"),
        s["position"],
        field_str(s, "caption"),
    );
    Ok(())
}

async fn remove(client: &ApiClient, base: &str, screenshot_id: &str) -> Result<()> {
    let response = client.delete(&format!("{base}/{screenshot_id}")).await?;
    let deleted = response["data"]["deleted"]
        .as_str()
        .unwrap_or(screenshot_id);
    println!("Removed: {deleted}");
    Ok(())
}

async fn reorder(client: &ApiClient, base: &str, ids: Vec<String>) -> Result<()> {
    let response = client
        .post_json(&format!("{base}/reorder"), &json!({"order": &ids}))
        .await?;
    let reordered: Vec<String> = response["data"]["reordered"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or(ids);
    println!("Reordered: {}", reordered.join(" "));
    Ok(())
}

fn field_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value[key].as_str().unwrap_or("")
}
