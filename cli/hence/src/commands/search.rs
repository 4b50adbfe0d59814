//! `hence search` — keyword and topic search over the gallery

use anyhow::Result;
use clap::Args;
use hence_api::ApiClient;
use hence_auth::Settings;
use serde_json::Value;

#[derive(Args)]
pub struct SearchArgs {
    /// Search keywords
    #[arg(default_value = "")]
    pub query: String,

    /// Filter by topic slug
    #[arg(long, default_value = "")]
    pub topic: String,

    /// Max results
    #[arg(long, default_value_t = 20)]
    pub limit: u32,

    /// Pagination offset
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Output raw JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SearchArgs, settings: Settings) -> Result<()> {
    let mut query = vec![
        ("limit", args.limit.to_string()),
        ("offset", args.offset.to_string()),
    ];
    if !args.query.is_empty() {
        query.push(("q", args.query.clone()));
    }
    if !args.topic.is_empty() {
        query.push(("topic", args.topic.clone()));
    }

    let client = ApiClient::new(settings)?;
    let response = client.get_with_query("/api/search", &query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", format_results(&response, client.base_url()));
    }
    Ok(())
}

/// Render results as a readable listing, one block per project.
fn format_results(response: &Value, base_url: &str) -> String {
    let projects = response["data"]
        .as_array()
        .or_else(|| response["projects"].as_array())
        .cloned()
        .unwrap_or_default();
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    let mut lines = Vec::new();
    for p in &projects {
        let id = p["id"].as_str().unwrap_or("?");
        let title = p["title"].as_str().unwrap_or("Untitled");
        let pitch = p["one_liner"].as_str().unwrap_or("");

        let agent_names: Vec<&str> = p["agents"]
            .as_array()
            .map(|agents| {
                agents
                    .iter()
                    .filter_map(|a| a["name"].as_str().or_else(|| a["slug"].as_str()))
                    .collect()
            })
            .unwrap_or_default();

        lines.push(format!("## {title}"));
        if !pitch.is_empty() {
            lines.push(format!("  {pitch}"));
        }
        if !agent_names.is_empty() {
            lines.push(format!("  Built with: {}", agent_names.join(", ")));
        }
        lines.push(format!("  Link: {base_url}/p/{id}"));
        lines.push(String::new());
    }

    let total = response["total"].as_u64().unwrap_or(projects.len() as u64);
    lines.push(format!("Showing {} of {} results.", projects.len(), total));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn formats_projects_with_agents_and_totals() {
        let response = json!({
            "data": [
                {
                    "id": "p-1",
                    "title": "Tasker",
                    "one_liner": "A tiny task CLI",
                    "agents": [{"name": "Claude Code"}],
                },
                {"id": "p-2", "title": "Blanko"},
            ],
            "total": 12,
        });
        let out = format_results(&response, "https://hence.sh");
        assert!(out.contains("## Tasker"));
        assert!(out.contains("  A tiny task CLI"));
        assert!(out.contains("  Built with: Claude Code"));
        assert!(out.contains("  Link: https://hence.sh/p/p-1"));
        assert!(out.contains("## Blanko"));
        assert!(out.ends_with("Showing 2 of 12 results."));
    }

    #[test]
    fn falls_back_to_projects_key_and_counts_without_total() {
        let response = json!({"projects": [{"id": "x", "title": "Solo"}]});
        let out = format_results(&response, "https://hence.sh");
        assert!(out.contains("## Solo"));
        assert!(out.ends_with("Showing 1 of 1 results."));
    }

    #[test]
    fn empty_results_say_so() {
        let response = json!({"data": []});
        assert_eq!(format_results(&response, "https://hence.sh"), "No projects found.");
    }
}
