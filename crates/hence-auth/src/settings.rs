//! Resolved runtime settings
//!
//! The API origin and config directory are resolved once at startup and
//! injected into every component; business logic never reads the
//! environment itself.

use std::path::PathBuf;

use crate::constants::{API_URL_ENV, CONFIG_DIR_NAME, DEFAULT_API_BASE};
use crate::error::{Error, Result};

/// Immutable per-invocation settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API origin, no trailing slash (e.g. `https://hence.sh`)
    pub api_base_url: String,
    /// Directory holding the `token` and `credentials` files
    pub config_dir: PathBuf,
}

impl Settings {
    /// Explicit settings, used by tests and anything embedding the library.
    pub fn new(api_base_url: impl Into<String>, config_dir: impl Into<PathBuf>) -> Self {
        let mut api_base_url = api_base_url.into();
        while api_base_url.ends_with('/') {
            api_base_url.pop();
        }
        Self {
            api_base_url,
            config_dir: config_dir.into(),
        }
    }

    /// Resolve settings for a CLI invocation.
    ///
    /// API origin: `HENCE_API_URL` env var, falling back to the default.
    /// Config directory: `$HOME/.hence`.
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Io("could not determine home directory".into()))?;

        Ok(Self::new(api_base_url, home.join(CONFIG_DIR_NAME)))
    }

    /// Join a path (starting with `/`) onto the API origin.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    fn env_var_overrides_default_origin() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env(API_URL_ENV, "http://localhost:3000") };
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.api_base_url, "http://localhost:3000");
        unsafe { remove_env(API_URL_ENV) };
    }

    #[test]
    fn default_origin_when_env_unset() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env(API_URL_ENV) };
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE);
        assert!(settings.config_dir.ends_with(CONFIG_DIR_NAME));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let settings = Settings::new("https://hence.sh/", "/tmp/hence");
        assert_eq!(settings.api_url("/api/search"), "https://hence.sh/api/search");
    }
}
