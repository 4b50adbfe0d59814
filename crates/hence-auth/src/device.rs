//! OAuth-style device authorization flow
//!
//! The interactive login handshake: register a device, show the user a code
//! and verification URL, then poll the token-exchange endpoint until the
//! user approves (or the session dies).
//!
//! The flow is an explicit state machine —
//! `Idle → Initiated → Polling → {Authorized | Expired | Denied | Failed}` —
//! with a pure poll classifier, so every transition can be driven from a
//! test without a server. The driver (`poll_until_authorized`) executes the
//! I/O the states imply: a blocking single-task wait, interrupted only by
//! the session deadline or process termination.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_FLOW_TTL_SECS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TOKEN_TTL_SECS, DEVICE_ENDPOINT,
    DEVICE_TOKEN_ENDPOINT,
};
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::settings::Settings;

fn default_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_flow_ttl() -> u64 {
    DEFAULT_FLOW_TTL_SECS
}

/// Ephemeral device-flow session, never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSession {
    /// Opaque code sent back to the server on each poll
    pub device_code: String,
    /// Human-readable code the user enters in the browser
    pub user_code: String,
    /// URL the user visits to approve the login
    pub verification_uri: String,
    /// Minimum seconds between polls
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Total session lifetime in seconds
    #[serde(default = "default_flow_ttl")]
    pub expires_in: u64,
}

/// Successful token exchange payload.
#[derive(Debug, Deserialize)]
pub struct DeviceTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Classification of one poll response. Pure data, no I/O.
#[derive(Debug)]
pub enum PollOutcome {
    /// User approved; tokens ready to persist
    Authorized(DeviceTokenResponse),
    /// `authorization_pending` — the expected steady state, keep polling
    Pending,
    /// `expired_token` — the server gave up on this session
    Expired,
    /// `access_denied` — the user refused
    Denied,
    /// Anything else, surfaced with the raw status and body
    Failed { status: u16, body: String },
}

/// Device flow states. Terminal states absorb further outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Initiated,
    Polling,
    Authorized,
    Expired,
    Denied,
    Failed,
}

impl FlowState {
    /// Apply one poll outcome. Pure function: no I/O.
    pub fn advance(self, outcome: &PollOutcome) -> FlowState {
        match (self, outcome) {
            (FlowState::Polling, PollOutcome::Authorized(_)) => FlowState::Authorized,
            (FlowState::Polling, PollOutcome::Pending) => FlowState::Polling,
            (FlowState::Polling, PollOutcome::Expired) => FlowState::Expired,
            (FlowState::Polling, PollOutcome::Denied) => FlowState::Denied,
            (FlowState::Polling, PollOutcome::Failed { .. }) => FlowState::Failed,
            // Poll outcomes only mean something while polling
            (state, _) => state,
        }
    }

    /// State label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::Initiated => "initiated",
            FlowState::Polling => "polling",
            FlowState::Authorized => "authorized",
            FlowState::Expired => "expired",
            FlowState::Denied => "denied",
            FlowState::Failed => "failed",
        }
    }
}

/// Classify one token-exchange response. Pure function: no I/O.
///
/// A 2xx body must carry both tokens; a non-2xx body is expected to be
/// `{"error": <code>}`. Anything unrecognized becomes `Failed` with the raw
/// status and body so the user sees what the server actually said.
pub fn classify_poll(status: u16, body: &str) -> PollOutcome {
    if (200..300).contains(&status) {
        return match serde_json::from_str::<DeviceTokenResponse>(body) {
            Ok(token) => PollOutcome::Authorized(token),
            Err(_) => PollOutcome::Failed {
                status,
                body: body.to_string(),
            },
        };
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        error: String,
    }

    let code = serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error)
        .unwrap_or_default();

    match code.as_str() {
        "authorization_pending" => PollOutcome::Pending,
        "expired_token" => PollOutcome::Expired,
        "access_denied" => PollOutcome::Denied,
        _ => PollOutcome::Failed {
            status,
            body: body.to_string(),
        },
    }
}

/// Register a device with the API: `Idle → Initiated`.
///
/// Any transport error or non-2xx response is fatal; there is no retry.
pub async fn start_session(
    client: &reqwest::Client,
    settings: &Settings,
) -> Result<DeviceSession> {
    let response = client
        .post(settings.api_url(DEVICE_ENDPOINT))
        .send()
        .await
        .map_err(|e| Error::DeviceFlowStart(format!("could not reach API: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::DeviceFlowStart(format!("{status}: {body}")));
    }

    let session = response
        .json::<DeviceSession>()
        .await
        .map_err(|e| Error::DeviceFlowStart(format!("invalid device response: {e}")))?;

    debug!(
        interval = session.interval,
        expires_in = session.expires_in,
        "device flow initiated"
    );
    Ok(session)
}

/// Poll until the user approves: `Polling → {Authorized | Expired | Denied |
/// Failed}`, persisting credentials on success.
///
/// Sleeps `interval` seconds between polls. The deadline is fixed at entry
/// from the session's `expires_in` — a server that never expires its codes
/// still can't keep us polling forever. `on_poll` runs before each poll so
/// the CLI can show progress.
pub async fn poll_until_authorized(
    client: &reqwest::Client,
    settings: &Settings,
    store: &CredentialStore,
    session: &DeviceSession,
    mut on_poll: impl FnMut(),
) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(session.expires_in);
    let interval = Duration::from_secs(session.interval);
    let mut state = FlowState::Polling;

    while Instant::now() < deadline {
        tokio::time::sleep(interval).await;
        on_poll();

        let response = client
            .post(settings.api_url(DEVICE_TOKEN_ENDPOINT))
            .json(&serde_json::json!({ "device_code": session.device_code }))
            .send()
            .await
            .map_err(|e| Error::DeviceFlowPoll(format!("could not reach API: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        let outcome = classify_poll(status, &body);
        state = state.advance(&outcome);
        debug!(state = state.label(), "device flow transition");

        match outcome {
            PollOutcome::Authorized(token) => {
                let ttl = token.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
                store
                    .save_credentials(&token.access_token, &token.refresh_token, ttl)
                    .await?;
                info!("device flow authorized, credentials saved");
                return Ok(());
            }
            PollOutcome::Pending => {}
            PollOutcome::Expired => return Err(Error::DeviceFlowExpired),
            PollOutcome::Denied => return Err(Error::DeviceFlowDenied),
            PollOutcome::Failed { status, body } => {
                return Err(Error::DeviceFlowPoll(format!("{status}: {body}")));
            }
        }
    }

    Err(Error::DeviceFlowTimeout)
}
