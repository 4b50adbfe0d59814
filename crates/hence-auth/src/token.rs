//! Access token resolution
//!
//! `TokenProvider` is the single entry point every API-calling command uses.
//! Resolution order is cheapest-first: a cached token that is still valid
//! costs no network call; an expired one costs a single refresh; and when
//! neither works the provider falls back to the legacy flat token file so
//! static-key deployments (CI) keep working.
//!
//! A failed refresh is swallowed deliberately — the original behavior does
//! not distinguish a revoked refresh token from a network blip, and both
//! fall through to the legacy token. The failure is logged at `warn` so the
//! gap is at least observable.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_TOKEN_TTL_SECS, EXPIRY_BUFFER_SECS, HTTP_TIMEOUT, REFRESH_ENDPOINT};
use crate::credentials::{CredentialStore, now_epoch_secs};
use crate::error::{Error, Result};
use crate::secret::Secret;
use crate::settings::Settings;

/// Response from the refresh endpoint.
///
/// The server may or may not echo a refresh token; when it does, the echoed
/// one is authoritative and replaces the one that was sent.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the new access token expires (delta, not absolute)
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_access_token(
    client: &reqwest::Client,
    settings: &Settings,
    refresh_token: &str,
) -> Result<RefreshResponse> {
    let response = client
        .post(settings.api_url(REFRESH_ENDPOINT))
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .map_err(|e| Error::Transport(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Transport(format!(
            "refresh endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<RefreshResponse>()
        .await
        .map_err(|e| Error::CredentialParse(format!("invalid refresh response: {e}")))
}

/// Resolves a currently valid access token for API calls.
pub struct TokenProvider {
    client: reqwest::Client,
    settings: Settings,
    store: CredentialStore,
}

impl TokenProvider {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(format!("building http client: {e}")))?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: reqwest::Client, settings: Settings) -> Self {
        let store = CredentialStore::new(settings.config_dir.clone());
        Self {
            client,
            settings,
            store,
        }
    }

    /// The credential store backing this provider.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Resolve a valid access token.
    ///
    /// 1. Cached structured credentials still valid past the 60s buffer are
    ///    returned without any network call.
    /// 2. Expired credentials with a refresh token cost exactly one refresh
    ///    call; on success the new record is persisted (server-echoed
    ///    refresh token wins over the one that was sent) and returned.
    /// 3. Any refresh failure, or no structured credentials at all, falls
    ///    back to the legacy token file. Only when that too is unusable does
    ///    this fail, with `NotAuthenticated` (or `EmptyCredential` for a
    ///    blank file).
    pub async fn access_token(&self) -> Result<Secret<String>> {
        if let Some(record) = self.store.load_credentials().await {
            if record.expires_at > now_epoch_secs() + EXPIRY_BUFFER_SECS {
                debug!("using cached access token");
                return Ok(record.access_token.clone());
            }

            let sent_refresh = record.refresh_token.expose().clone();
            if !sent_refresh.is_empty() {
                match refresh_access_token(&self.client, &self.settings, &sent_refresh).await {
                    Ok(refreshed) => {
                        let refresh = refreshed
                            .refresh_token
                            .unwrap_or(sent_refresh);
                        let ttl = refreshed.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
                        self.store
                            .save_credentials(&refreshed.access_token, &refresh, ttl)
                            .await?;
                        info!("access token refreshed");
                        return Ok(Secret::new(refreshed.access_token));
                    }
                    Err(e) => {
                        warn!(error = %e, "token refresh failed, falling back to legacy token");
                    }
                }
            }
        }

        self.store.load_legacy_token().await.map(Secret::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;

    /// Fixed response script for the mock refresh endpoint.
    #[derive(Clone)]
    struct Script {
        calls: Arc<AtomicUsize>,
        status: StatusCode,
        body: serde_json::Value,
    }

    async fn refresh_handler(State(script): State<Script>) -> (StatusCode, Json<serde_json::Value>) {
        script.calls.fetch_add(1, Ordering::SeqCst);
        (script.status, Json(script.body.clone()))
    }

    /// Start a scripted refresh endpoint on 127.0.0.1. Every hit bumps the
    /// returned counter; the response is fixed per server.
    async fn start_refresh_server(
        status: StatusCode,
        body: serde_json::Value,
    ) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let app = axum::Router::new()
            .route(REFRESH_ENDPOINT, post(refresh_handler))
            .with_state(Script {
                calls: calls.clone(),
                status,
                body,
            });

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (url, calls)
    }

    fn provider_for(dir: &tempfile::TempDir, base_url: &str) -> TokenProvider {
        TokenProvider::with_client(
            reqwest::Client::new(),
            Settings::new(base_url, dir.path().join("hence")),
        )
    }

    #[tokio::test]
    async fn valid_cached_token_makes_no_network_call() {
        let (url, calls) = start_refresh_server(
            StatusCode::OK,
            serde_json::json!({"access_token": "should-not-be-used"}),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, &url);
        provider
            .store()
            .save_credentials("cached", "rt", 7200)
            .await
            .unwrap();

        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose(), "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "fast path must not hit the network");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_once_and_persisted() {
        let (url, calls) = start_refresh_server(
            StatusCode::OK,
            serde_json::json!({"access_token": "fresh", "expires_in": 1800}),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, &url);
        // TTL below the 60s buffer counts as expired
        provider
            .store()
            .save_credentials("stale", "rt-sent", 30)
            .await
            .unwrap();

        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "exactly one refresh call");

        let record = provider.store().load_credentials().await.unwrap();
        assert_eq!(record.access_token.expose(), "fresh");
        // Server did not echo a refresh token, so the one we sent is kept
        assert_eq!(record.refresh_token.expose(), "rt-sent");
        let expected = now_epoch_secs() + 1800;
        assert!(record.expires_at.abs_diff(expected) <= 5);
    }

    #[tokio::test]
    async fn server_echoed_refresh_token_wins() {
        let (url, _calls) = start_refresh_server(
            StatusCode::OK,
            serde_json::json!({"access_token": "fresh", "refresh_token": "rt-new"}),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, &url);
        provider
            .store()
            .save_credentials("stale", "rt-old", 0)
            .await
            .unwrap();

        provider.access_token().await.unwrap();
        let record = provider.store().load_credentials().await.unwrap();
        assert_eq!(record.refresh_token.expose(), "rt-new");
        // Omitted expires_in defaults to one hour
        let expected = now_epoch_secs() + DEFAULT_TOKEN_TTL_SECS;
        assert!(record.expires_at.abs_diff(expected) <= 5);
    }

    #[tokio::test]
    async fn rejected_refresh_falls_back_to_legacy_token() {
        let (url, calls) = start_refresh_server(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": "invalid_refresh_token"}),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, &url);
        provider.store().save_credentials("stale", "rt", 0).await.unwrap();
        provider.store().save_legacy_token("static-key").await.unwrap();

        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose(), "static-key");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no refresh retries");
    }

    #[tokio::test]
    async fn transport_failure_falls_back_to_legacy_token() {
        // Port 1 refuses connections — simulates an unreachable API
        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, "http://127.0.0.1:1");
        provider.store().save_credentials("stale", "rt", 0).await.unwrap();
        provider.store().save_legacy_token("static-key").await.unwrap();

        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose(), "static-key");
    }

    #[tokio::test]
    async fn exhausted_fallbacks_report_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, "http://127.0.0.1:1");
        provider.store().save_credentials("stale", "rt", 0).await.unwrap();

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated), "got: {err:?}");
    }

    #[tokio::test]
    async fn no_credentials_at_all_reports_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider_for(&dir, "http://127.0.0.1:1");

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated), "got: {err:?}");
    }

    #[test]
    fn refresh_response_tolerates_omitted_fields() {
        let json = r#"{"access_token":"at"}"#;
        let resp: RefreshResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "at");
        assert!(resp.refresh_token.is_none());
        assert!(resp.expires_in.is_none());
    }
}
