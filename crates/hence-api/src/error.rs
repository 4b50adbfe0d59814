//! Error types for API calls

/// Errors from authenticated resource calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is the server's `{error}` string when the
    /// body parses as JSON, else the raw body.
    #[error("API returned {status} — {message}")]
    Api { status: u16, message: String },

    #[error("could not reach API: {0}")]
    Transport(String),

    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Auth(#[from] hence_auth::Error),

    #[error("file not found: {0}")]
    FileNotFound(String),
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = ApiError::Api {
            status: 422,
            message: "title is required".into(),
        };
        assert_eq!(err.to_string(), "API returned 422 — title is required");
    }

    #[test]
    fn auth_errors_pass_through_their_message() {
        let err = ApiError::from(hence_auth::Error::NotAuthenticated);
        assert!(err.to_string().contains("hence auth"));
    }
}
