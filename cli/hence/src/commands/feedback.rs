//! `hence feedback` — submit experience feedback to the gallery team

use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use hence_api::ApiClient;
use hence_auth::Settings;
use serde_json::Value;

const VALID_UX_ASPECTS: &[&str] = &[
    "onboarding",
    "discovery",
    "sharing",
    "collections",
    "navigation",
    "overall",
];

const VALID_AGENT_ASPECTS: &[&str] = &[
    "auth_flow",
    "api_ergonomics",
    "skill_install",
    "error_messages",
    "documentation",
    "overall",
];

const MAX_COMMENT_LEN: usize = 2000;

#[derive(Clone, Copy, ValueEnum)]
pub enum Source {
    User,
    Agent,
    Both,
}

impl Source {
    fn as_str(self) -> &'static str {
        match self {
            Source::User => "user",
            Source::Agent => "agent",
            Source::Both => "both",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Category {
    UserExperience,
    AgentExperience,
}

impl Category {
    fn as_str(self) -> &'static str {
        match self {
            Category::UserExperience => "user_experience",
            Category::AgentExperience => "agent_experience",
        }
    }

    fn valid_aspects(self) -> &'static [&'static str] {
        match self {
            Category::UserExperience => VALID_UX_ASPECTS,
            Category::AgentExperience => VALID_AGENT_ASPECTS,
        }
    }
}

#[derive(Args)]
pub struct FeedbackArgs {
    /// Who is submitting
    #[arg(long, value_enum)]
    pub source: Source,

    /// Feedback category
    #[arg(long, value_enum)]
    pub category: Category,

    /// Specific aspect (depends on category)
    #[arg(long)]
    pub aspect: Option<String>,

    /// Rating from 1 to 5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: Option<u8>,

    /// Free-form comment (max 2000 characters)
    #[arg(long)]
    pub comment: Option<String>,

    /// Name of the agent submitting the feedback
    #[arg(long)]
    pub agent_name: Option<String>,

    /// Skill name providing context for this feedback
    #[arg(long)]
    pub skill_context: Option<String>,
}

pub async fn run(args: FeedbackArgs, settings: Settings) -> Result<()> {
    let payload = build_payload(&args)?;

    let client = ApiClient::new(settings)?;
    let response = client.post_json("/api/feedback", &payload).await?;

    println!("Feedback submitted successfully.");
    if let Some(id) = response["data"]["id"].as_str() {
        println!("  ID: {id}");
    }
    Ok(())
}

/// Validate the argument combination and assemble the request body.
fn build_payload(args: &FeedbackArgs) -> Result<Value> {
    if args.rating.is_none() && args.comment.as_deref().unwrap_or("").is_empty() {
        bail!("At least one of --rating or --comment is required.");
    }

    if let Some(comment) = &args.comment {
        if comment.chars().count() > MAX_COMMENT_LEN {
            bail!("--comment must be {MAX_COMMENT_LEN} characters or less.");
        }
    }

    if let Some(aspect) = &args.aspect {
        let valid = args.category.valid_aspects();
        if !valid.contains(&aspect.as_str()) {
            bail!("--aspect must be one of: {}", valid.join(", "));
        }
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "source".to_string(),
        Value::String(args.source.as_str().to_string()),
    );
    payload.insert(
        "category".to_string(),
        Value::String(args.category.as_str().to_string()),
    );
    if let Some(aspect) = &args.aspect {
        payload.insert("aspect".to_string(), Value::String(aspect.clone()));
    }
    if let Some(rating) = args.rating {
        payload.insert("rating".to_string(), Value::from(rating));
    }
    if let Some(comment) = &args.comment {
        payload.insert("comment".to_string(), Value::String(comment.clone()));
    }
    if let Some(agent_name) = &args.agent_name {
        payload.insert("agent_name".to_string(), Value::String(agent_name.clone()));
    }
    if let Some(skill_context) = &args.skill_context {
        payload.insert(
            "skill_context".to_string(),
            Value::String(skill_context.clone()),
        );
    }
    Ok(Value::Object(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> FeedbackArgs {
        FeedbackArgs {
            source: Source::Agent,
            category: Category::AgentExperience,
            aspect: None,
            rating: None,
            comment: None,
            agent_name: None,
            skill_context: None,
        }
    }

    #[test]
    fn requires_rating_or_comment() {
        let err = build_payload(&base_args()).unwrap_err();
        assert!(err.to_string().contains("--rating or --comment"));
    }

    #[test]
    fn rejects_overlong_comment() {
        let mut args = base_args();
        args.comment = Some("x".repeat(2001));
        let err = build_payload(&args).unwrap_err();
        assert!(err.to_string().contains("2000 characters"));
    }

    #[test]
    fn aspect_must_match_category() {
        let mut args = base_args();
        args.rating = Some(4);
        args.aspect = Some("onboarding".to_string());
        let err = build_payload(&args).unwrap_err();
        assert!(err.to_string().contains("auth_flow"));

        args.category = Category::UserExperience;
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["aspect"], "onboarding");
        assert_eq!(payload["category"], "user_experience");
    }

    #[test]
    fn optional_fields_are_omitted_not_null() {
        let mut args = base_args();
        args.rating = Some(5);
        let payload = build_payload(&args).unwrap();
        assert_eq!(payload["source"], "agent");
        assert_eq!(payload["rating"], 5);
        let keys: Vec<&String> = payload.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["category", "rating", "source"]);
    }
}
