//! `hence collections` — curate boards of gallery projects

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use hence_api::ApiClient;
use hence_auth::Settings;
use serde_json::{Value, json};

#[derive(Args)]
pub struct CollectionsArgs {
    #[command(subcommand)]
    pub action: CollectionAction,
}

#[derive(Subcommand)]
pub enum CollectionAction {
    /// List your collections
    List,
    /// Create a new collection
    Create {
        /// Collection name
        #[arg(long)]
        name: String,
        /// Collection description
        #[arg(long, default_value = "")]
        description: String,
        /// Make collection private
        #[arg(long)]
        private: bool,
    },
    /// View a collection's projects
    View {
        /// Collection UUID
        collection_id: String,
    },
    /// Search within a collection
    Search {
        /// Collection UUID
        collection_id: String,
        /// Search keywords
        query: String,
    },
    /// Add a project to a collection
    Add {
        /// Collection UUID
        #[arg(long)]
        collection: String,
        /// Project UUID
        #[arg(long)]
        project: String,
    },
    /// Remove a project from a collection
    Remove {
        /// Collection UUID
        #[arg(long)]
        collection: String,
        /// Project UUID
        #[arg(long)]
        project: String,
    },
    /// Update a collection's name, description, or visibility
    Update {
        /// Collection UUID
        collection_id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Make public
        #[arg(long, conflicts_with = "private")]
        public: bool,
        /// Make private
        #[arg(long)]
        private: bool,
    },
    /// Delete a collection
    Delete {
        /// Collection UUID
        collection_id: String,
    },
}

pub async fn run(args: CollectionsArgs, settings: Settings) -> Result<()> {
    let client = ApiClient::new(settings)?;

    match args.action {
        CollectionAction::List => list(&client).await,
        CollectionAction::Create {
            name,
            description,
            private,
        } => create(&client, name, description, private).await,
        CollectionAction::View { collection_id } => view(&client, &collection_id).await,
        CollectionAction::Search {
            collection_id,
            query,
        } => search(&client, &collection_id, &query).await,
        CollectionAction::Add {
            collection,
            project,
        } => add(&client, &collection, &project).await,
        CollectionAction::Remove {
            collection,
            project,
        } => remove(&client, &collection, &project).await,
        CollectionAction::Update {
            collection_id,
            name,
            description,
            public,
            private,
        } => update(&client, &collection_id, name, description, public, private).await,
        CollectionAction::Delete { collection_id } => delete(&client, &collection_id).await,
    }
}

async fn list(client: &ApiClient) -> Result<()> {
    let response = client.get("/api/collections").await?;
    let collections = response["data"].as_array().cloned().unwrap_or_default();
    if collections.is_empty() {
        println!("You have no collections yet. Create one with: hence collections create --name \"My Board\"");
        return Ok(());
    }
    println!("Your collections:\n");
    for c in &collections {
        let items = c["collection_items"].as_array().map_or(0, Vec::len);
        let visibility = if c["is_public"].as_bool().unwrap_or(true) {
            "public"
        } else {
            "private"
        };
        println!(
            "  {}  ({items} items, {visibility})",
            c["name"].as_str().unwrap_or("?")
        );
        if let Some(description) = c["description"].as_str().filter(|d| !d.is_empty()) {
            println!("    {description}");
        }
        println!("    ID: {}", c["id"].as_str().unwrap_or("?"));
        println!();
    }
    Ok(())
}

async fn create(client: &ApiClient, name: String, description: String, private: bool) -> Result<()> {
    let body = json!({
        "name": name,
        "description": description,
        "is_public": !private,
    });
    let response = client.post_json("/api/collections", &body).await?;
    let collection = &response["data"];
    println!(
        "Collection created: {}",
        collection["name"].as_str().unwrap_or(&name)
    );
    println!("  ID: {}", collection["id"].as_str().unwrap_or("?"));
    Ok(())
}

async fn view(client: &ApiClient, collection_id: &str) -> Result<()> {
    let response = client
        .get(&format!("/api/collections/{collection_id}"))
        .await?;
    let collection = &response["data"];
    let items = collection["items"].as_array().cloned().unwrap_or_default();

    println!("## {}", collection["name"].as_str().unwrap_or("Untitled"));
    if let Some(description) = collection["description"].as_str().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }
    let total = collection["total"].as_u64().unwrap_or(items.len() as u64);
    println!("  {total} projects\n");

    if items.is_empty() {
        println!("  No projects in this collection yet.");
        return Ok(());
    }

    for item in &items {
        let post = &item["post"];
        if post.is_null() {
            continue;
        }
        print_post(post, client.base_url(), true);
    }
    Ok(())
}

async fn search(client: &ApiClient, collection_id: &str, query: &str) -> Result<()> {
    let response = client
        .get_with_query(
            &format!("/api/collections/{collection_id}"),
            &[("q", query.to_string())],
        )
        .await?;
    let collection = &response["data"];
    let items = collection["items"].as_array().cloned().unwrap_or_default();
    let total = collection["total"].as_u64().unwrap_or(items.len() as u64);

    println!(
        "Search results in \"{}\" for \"{query}\":\n",
        collection["name"].as_str().unwrap_or("collection")
    );

    if items.is_empty() {
        println!("  No matching projects found.");
        return Ok(());
    }

    for item in &items {
        let post = &item["post"];
        if post.is_null() {
            continue;
        }
        print_post(post, client.base_url(), false);
    }

    println!("Found {total} matching projects.");
    Ok(())
}

async fn add(client: &ApiClient, collection: &str, project: &str) -> Result<()> {
    let body = json!({"collection_id": collection, "post_id": project});
    client.post_json("/api/collections/items", &body).await?;
    println!("Project {project} added to collection {collection}.");
    Ok(())
}

async fn remove(client: &ApiClient, collection: &str, project: &str) -> Result<()> {
    client
        .delete_with_query(
            "/api/collections/items",
            &[
                ("collection_id", collection.to_string()),
                ("post_id", project.to_string()),
            ],
        )
        .await?;
    println!("Project {project} removed from collection {collection}.");
    Ok(())
}

async fn update(
    client: &ApiClient,
    collection_id: &str,
    name: Option<String>,
    description: Option<String>,
    public: bool,
    private: bool,
) -> Result<()> {
    let mut body = serde_json::Map::new();
    if let Some(name) = name {
        body.insert("name".to_string(), Value::String(name));
    }
    if let Some(description) = description {
        body.insert("description".to_string(), Value::String(description));
    }
    if public {
        body.insert("is_public".to_string(), Value::Bool(true));
    } else if private {
        body.insert("is_public".to_string(), Value::Bool(false));
    }

    if body.is_empty() {
        bail!("Nothing to update. Provide --name, --description, --public, or --private.");
    }

    let response = client
        .patch_json(&format!("/api/collections/{collection_id}"), &Value::Object(body))
        .await?;
    println!(
        "Collection updated: {}",
        response["data"]["name"].as_str().unwrap_or("?")
    );
    Ok(())
}

async fn delete(client: &ApiClient, collection_id: &str) -> Result<()> {
    client
        .delete(&format!("/api/collections/{collection_id}"))
        .await?;
    println!("Collection {collection_id} deleted.");
    Ok(())
}

/// One project block within a collection listing. `with_agents` includes the
/// "Built with" line, which the nested search view omits.
fn print_post(post: &Value, base_url: &str, with_agents: bool) {
    let title = post["title"].as_str().unwrap_or("Untitled");
    let pitch = post["one_liner"].as_str().unwrap_or("");
    let id = post["id"].as_str().unwrap_or("?");

    println!("  ### {title}");
    if !pitch.is_empty() {
        println!("    {pitch}");
    }
    if with_agents {
        let agent_names: Vec<&str> = post["post_agents"]
            .as_array()
            .map(|agents| {
                agents
                    .iter()
                    .filter_map(|a| a["agents"]["name"].as_str())
                    .filter(|n| !n.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if !agent_names.is_empty() {
            println!("    Built with: {}", agent_names.join(", "));
        }
    }
    println!("    Link: {base_url}/p/{id}");
    println!();
}
