//! Hence API and credential layout constants
//!
//! Endpoint paths and on-disk file names. None of these are secrets — the
//! secrets (access/refresh tokens, API keys) live in the files the
//! credential store manages.

use std::time::Duration;

/// Default API origin when `HENCE_API_URL` is not set
pub const DEFAULT_API_BASE: &str = "https://hence.sh";

/// Environment variable overriding the API origin for all commands
pub const API_URL_ENV: &str = "HENCE_API_URL";

/// Per-user configuration directory name (under `$HOME`)
pub const CONFIG_DIR_NAME: &str = ".hence";

/// Legacy flat token file (a single static bearer string)
pub const LEGACY_TOKEN_FILE: &str = "token";

/// Structured credential file (JSON: access/refresh tokens + expiry)
pub const CREDENTIALS_FILE: &str = "credentials";

/// Device registration endpoint (empty POST body)
pub const DEVICE_ENDPOINT: &str = "/api/auth/device";

/// Device code exchange endpoint, polled until the user approves
pub const DEVICE_TOKEN_ENDPOINT: &str = "/api/auth/device/token";

/// Refresh token exchange endpoint
pub const REFRESH_ENDPOINT: &str = "/api/auth/refresh";

/// Access tokens within this many seconds of expiry are treated as expired.
/// `expires_at` is derived from a server-reported TTL, never exact.
pub const EXPIRY_BUFFER_SECS: u64 = 60;

/// TTL assumed when the server omits `expires_in` from a token response
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Poll spacing assumed when the server omits `interval`
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Device flow session lifetime assumed when the server omits `expires_in`
pub const DEFAULT_FLOW_TTL_SECS: u64 = 900;

/// Timeout for every auth endpoint call; no operation blocks indefinitely
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
