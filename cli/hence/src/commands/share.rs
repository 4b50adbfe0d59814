//! `hence share` — upload a new project with screenshots

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use hence_api::{ApiClient, FilePart};
use hence_auth::Settings;
use tracing::warn;

use super::{confirm, require_json_array};

/// Screenshot cap enforced server-side; extra paths are dropped client-side
const MAX_SCREENSHOTS: usize = 5;

#[derive(Args)]
pub struct ShareArgs {
    /// Project title
    #[arg(long)]
    pub title: String,

    /// Short pitch
    #[arg(long)]
    pub one_liner: String,

    /// Screenshot path (repeat for multiple, max 5; the first is primary)
    #[arg(long = "screenshot", required = true)]
    pub screenshots: Vec<PathBuf>,

    /// Full project description
    #[arg(long, default_value = "")]
    pub description: String,

    /// JSON array of topic slugs, e.g. '["cli","react"]'
    #[arg(long, default_value = "[]")]
    pub topics: String,

    /// JSON array of agent objects, e.g. '[{"slug":"claude_code","model_slug":"claude-sonnet-4"}]'
    #[arg(long, default_value = "[]")]
    pub agents: String,

    /// Project URL
    #[arg(long, default_value = "")]
    pub url: String,

    /// Deployment status: local, closed, or public
    #[arg(long, default_value = "public")]
    pub deployment_status: String,

    /// UUID of an inspiring project
    #[arg(long = "inspired-by", default_value = "")]
    pub inspired_by: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub async fn run(args: ShareArgs, settings: Settings) -> Result<()> {
    require_json_array("topics", &args.topics)?;
    require_json_array("agents", &args.agents)?;

    println!("--- Review Project ---");
    println!("  Title:        {}", args.title);
    println!("  One-liner:    {}", args.one_liner);
    if !args.description.is_empty() {
        let preview: String = args.description.chars().take(100).collect();
        println!("  Description:  {preview}...");
    }
    println!("  Topics:       {}", args.topics);
    println!("  Agents:       {}", args.agents);
    let paths: Vec<String> = args
        .screenshots
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!("  Screenshots:  {}", paths.join(", "));
    if !args.url.is_empty() {
        println!("  URL:          {}", args.url);
    }
    println!("----------------------");

    if !args.yes && !confirm("Share this project?")? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut fields = vec![
        ("title".to_string(), args.title),
        ("one_liner".to_string(), args.one_liner),
        ("description".to_string(), args.description),
        ("topics".to_string(), args.topics),
        ("agents".to_string(), args.agents),
        ("url".to_string(), args.url),
        ("deployment_status".to_string(), args.deployment_status),
    ];
    if !args.inspired_by.is_empty() {
        fields.push(("inspired_by_id".to_string(), args.inspired_by));
    }

    if args.screenshots.len() > MAX_SCREENSHOTS {
        warn!(
            given = args.screenshots.len(),
            "too many screenshots, keeping the first {MAX_SCREENSHOTS}"
        );
    }
    let files: Vec<FilePart> = args
        .screenshots
        .iter()
        .take(MAX_SCREENSHOTS)
        .enumerate()
        .map(|(i, path)| {
            if i == 0 {
                FilePart::new("primary_screenshot", path)
            } else {
                FilePart::new(format!("screenshot_{i}"), path)
            }
        })
        .collect();

    let client = ApiClient::new(settings)?;
    let response = client.post_multipart("/api/projects", fields, files).await?;

    let project_id = response["data"]["id"].as_str().unwrap_or("unknown");
    println!();
    println!(
        "Shared successfully! View at: {}/p/{project_id}",
        client.base_url()
    );
    Ok(())
}
