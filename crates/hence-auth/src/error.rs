//! Error types for credential and token operations

/// Errors from credential storage, token resolution, and the device flow.
///
/// Device flow variants are all fatal: the library never retries them
/// itself. The only silent recovery anywhere is `TokenProvider`'s single
/// refresh-then-legacy-fallback step.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not authenticated — run `hence auth`, or get a token at hence.sh/settings")]
    NotAuthenticated,

    #[error("token file is empty — run `hence auth` to set a new token")]
    EmptyCredential,

    #[error("could not start device flow: {0}")]
    DeviceFlowStart(String),

    #[error("device flow poll failed: {0}")]
    DeviceFlowPoll(String),

    #[error("device code expired — please try again")]
    DeviceFlowExpired,

    #[error("authorization denied")]
    DeviceFlowDenied,

    #[error("timed out waiting for authorization")]
    DeviceFlowTimeout,

    #[error("could not reach API: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("credential parse error: {0}")]
    CredentialParse(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
