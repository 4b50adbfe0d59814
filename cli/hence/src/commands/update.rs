//! `hence update` — patch fields of an existing project

use anyhow::{Result, bail};
use clap::Args;
use hence_api::ApiClient;
use hence_auth::Settings;

use super::{confirm, require_json_array};

#[derive(Args)]
pub struct UpdateArgs {
    /// UUID of the project to update
    pub project_id: String,

    /// New title
    #[arg(long, default_value = "")]
    pub title: String,

    /// New pitch
    #[arg(long, default_value = "")]
    pub one_liner: String,

    /// JSON array of topic slugs
    #[arg(long, default_value = "")]
    pub topics: String,

    /// JSON array of agent objects
    #[arg(long, default_value = "")]
    pub agents: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub async fn run(args: UpdateArgs, settings: Settings) -> Result<()> {
    for (name, value) in [("topics", &args.topics), ("agents", &args.agents)] {
        if !value.is_empty() {
            require_json_array(name, value)?;
        }
    }

    let mut fields = Vec::new();
    let mut review = Vec::new();
    if !args.title.is_empty() {
        review.push(format!("  Title:       {}", args.title));
        fields.push(("title".to_string(), args.title));
    }
    if !args.one_liner.is_empty() {
        review.push(format!("  One-liner:   {}", args.one_liner));
        fields.push(("one_liner".to_string(), args.one_liner));
    }
    if !args.topics.is_empty() {
        review.push(format!("  Topics:      {}", args.topics));
        fields.push(("topics".to_string(), args.topics));
    }
    if !args.agents.is_empty() {
        review.push(format!("  Agents:      {}", args.agents));
        fields.push(("agents".to_string(), args.agents));
    }

    if fields.is_empty() {
        bail!("Nothing to update. Pass at least one field.");
    }

    println!("--- Updating project {} ---", args.project_id);
    for line in &review {
        println!("{line}");
    }
    println!("--------------------------------------");

    if !args.yes && !confirm("Apply these updates?")? {
        println!("Cancelled.");
        return Ok(());
    }

    let client = ApiClient::new(settings)?;
    client
        .patch_multipart(&format!("/api/projects/{}", args.project_id), fields, vec![])
        .await?;

    println!(
        "Updated successfully: {}/p/{}",
        client.base_url(),
        args.project_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_topics(topics: &str) -> UpdateArgs {
        UpdateArgs {
            project_id: "p-1".into(),
            title: String::new(),
            one_liner: String::new(),
            topics: topics.into(),
            agents: String::new(),
            yes: true,
        }
    }

    #[tokio::test]
    async fn non_array_topics_are_rejected_before_any_request() {
        let settings = Settings::new("http://127.0.0.1:1", "/nonexistent/hence");
        let err = run(args_with_topics("cli,react"), settings)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "--topics must be a JSON array. Got: cli,react"
        );
    }
}
