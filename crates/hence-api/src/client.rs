//! Authenticated request execution
//!
//! Every resource endpoint speaks the same envelope: a bearer token on the
//! way in, `{data: ...}` on success, `{error: string}` with a non-2xx
//! status on failure. `ApiClient` owns that shape once so each command
//! doesn't.
//!
//! Two underlying clients with different timeouts: 15s for JSON calls, 60s
//! for multipart uploads carrying screenshots.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hence_auth::{Settings, TokenProvider};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result};

/// Timeout for JSON resource calls
const JSON_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for multipart uploads (screenshots can be large)
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// A file attached to a multipart request.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name (e.g. `primary_screenshot`, `file`)
    pub field: String,
    pub path: PathBuf,
}

impl FilePart {
    pub fn new(field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            field: field.into(),
            path: path.into(),
        }
    }
}

/// Authenticated client for the Hence resource endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    upload: reqwest::Client,
    settings: Settings,
    auth: TokenProvider,
}

impl ApiClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let auth = TokenProvider::new(settings.clone())?;
        Self::with_provider(settings, auth)
    }

    pub fn with_provider(settings: Settings, auth: TokenProvider) -> Result<Self> {
        let build = |timeout| {
            reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| ApiError::Transport(format!("building http client: {e}")))
        };
        Ok(Self {
            http: build(JSON_TIMEOUT)?,
            upload: build(UPLOAD_TIMEOUT)?,
            settings,
            auth,
        })
    }

    /// The token provider backing this client.
    pub fn auth(&self) -> &TokenProvider {
        &self.auth
    }

    /// The resolved API origin.
    pub fn base_url(&self) -> &str {
        &self.settings.api_base_url
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.execute(self.http.get(self.settings.api_url(path)))
            .await
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.execute(self.http.get(self.settings.api_url(path)).query(query))
            .await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(self.http.post(self.settings.api_url(path)).json(body))
            .await
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(self.http.patch(self.settings.api_url(path)).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.execute(self.http.delete(self.settings.api_url(path)))
            .await
    }

    pub async fn delete_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.execute(self.http.delete(self.settings.api_url(path)).query(query))
            .await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    ) -> Result<Value> {
        let form = build_form(fields, files).await?;
        self.execute(self.upload.post(self.settings.api_url(path)).multipart(form))
            .await
    }

    pub async fn patch_multipart(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    ) -> Result<Value> {
        let form = build_form(fields, files).await?;
        self.execute(self.upload.patch(self.settings.api_url(path)).multipart(form))
            .await
    }

    /// Attach the bearer token, send, and unwrap the response envelope.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<Value> {
        let token = self.auth.access_token().await?;
        let response = builder
            .bearer_auth(token.expose())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("reading response body: {e}")))?;

        if !status.is_success() {
            // Prefer the server's {error} string; fall back to the raw body
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| body.clone());
            debug!(status = status.as_u16(), "API error response");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Assemble a multipart form from text fields and file attachments.
async fn build_form(fields: Vec<(String, String)>, files: Vec<FilePart>) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for file in files {
        form = form.part(file.field.clone(), file_part(&file.path).await?);
    }
    Ok(form)
}

async fn file_part(path: &Path) -> Result<Part> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::FileNotFound(path.display().to_string())
        } else {
            ApiError::Transport(format!("reading {}: {e}", path.display()))
        }
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("upload"));
    Ok(Part::bytes(data)
        .file_name(filename)
        .mime_str("application/octet-stream")
        .map_err(|e| ApiError::InvalidResponse(format!("building file part: {e}")))?)
}
