//! `hence metadata` — list the topics, agents, and models the gallery knows

use anyhow::Result;
use clap::{Args, ValueEnum};
use hence_api::{ApiClient, ApiError};
use hence_auth::Settings;
use serde_json::Value;

#[derive(Clone, Copy, PartialEq, ValueEnum)]
pub enum Kind {
    Topics,
    Agents,
    Models,
    All,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Topics => "topics",
            Kind::Agents => "agents",
            Kind::Models => "models",
            Kind::All => "all",
        }
    }
}

const KINDS: &[Kind] = &[Kind::Topics, Kind::Agents, Kind::Models];

#[derive(Args)]
pub struct MetadataArgs {
    /// Which listing to fetch
    #[arg(value_enum)]
    pub kind: Kind,

    /// Output raw JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: MetadataArgs, settings: Settings) -> Result<()> {
    let client = ApiClient::new(settings)?;

    if args.kind == Kind::All {
        // Best effort across all three; a failing endpoint shouldn't hide the rest.
        for kind in KINDS {
            let (listing, diagnostic) = render_kind(kind.label(), fetch(&client, *kind).await);
            if let Some(diagnostic) = diagnostic {
                eprintln!("{diagnostic}");
            }
            println!("{listing}");
            println!();
        }
        return Ok(());
    }

    let items = fetch(&client, args.kind).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("{}", format_items(&items, args.kind.label()));
    }
    Ok(())
}

/// One section of the `all` listing: a failing endpoint still yields its
/// empty-listing line, with the error reported separately on stderr.
fn render_kind(
    kind: &str,
    result: std::result::Result<Vec<Value>, ApiError>,
) -> (String, Option<String>) {
    match result {
        Ok(items) => (format_items(&items, kind), None),
        Err(e) => (format_items(&[], kind), Some(format!("Error: {e}"))),
    }
}

async fn fetch(client: &ApiClient, kind: Kind) -> std::result::Result<Vec<Value>, ApiError> {
    let response = client.get(&format!("/api/{}", kind.label())).await?;
    // Some deployments return a bare array instead of the {data} envelope.
    let items = response
        .as_array()
        .or_else(|| response["data"].as_array())
        .cloned()
        .unwrap_or_default();
    Ok(items)
}

fn format_items(items: &[Value], kind: &str) -> String {
    if items.is_empty() {
        return format!("No {kind} found.");
    }
    let mut lines = vec![format!("Available {kind}:")];
    for item in items {
        let slug = item["slug"]
            .as_str()
            .or_else(|| item["name"].as_str())
            .unwrap_or("?");
        let name = item["name"].as_str().unwrap_or(slug);
        if slug == name {
            lines.push(format!("  - {slug}"));
        } else {
            lines.push(format!("  - {name} ({slug})"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn names_and_slugs_render_together() {
        let items = vec![
            json!({"slug": "cli", "name": "CLI tools"}),
            json!({"slug": "web", "name": "web"}),
            json!({"name": "orphan"}),
        ];
        let out = format_items(&items, "topics");
        assert_eq!(
            out,
            "Available topics:\n  - CLI tools (cli)\n  - web\n  - orphan"
        );
    }

    #[test]
    fn empty_listing_reads_naturally() {
        assert_eq!(format_items(&[], "models"), "No models found.");
    }

    #[test]
    fn failed_endpoint_still_prints_an_empty_listing() {
        let (listing, diagnostic) = render_kind(
            "topics",
            Err(ApiError::Api {
                status: 500,
                message: "boom".into(),
            }),
        );
        assert_eq!(listing, "No topics found.");
        assert_eq!(diagnostic.unwrap(), "Error: API returned 500 — boom");
    }
}
