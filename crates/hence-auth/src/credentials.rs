//! Credential storage for the Hence config directory
//!
//! Owns the two files under `~/.hence`: the legacy flat token file (a static
//! API key) and the structured credential record produced by the device
//! flow. All writes go through atomic temp-file + rename and are 0600 on
//! unix, since both files hold bearer secrets.
//!
//! There is no cross-process locking: two CLI invocations racing on a
//! refresh can produce a stale read. Invocations are short-lived and
//! sequential in practice, so this is a documented limitation rather than
//! something the store coordinates.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{CREDENTIALS_FILE, LEGACY_TOKEN_FILE};
use crate::error::{Error, Result};
use crate::secret::Secret;

/// The structured credential record, overwritten wholesale on every refresh.
///
/// `expires_at` is a unix timestamp in seconds, computed at storage time
/// from the server-reported TTL. It is a derived estimate: callers apply
/// `EXPIRY_BUFFER_SECS` before trusting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Short-lived bearer token for API calls
    pub access_token: Secret<String>,
    /// Long-lived token exchanged for new access tokens
    pub refresh_token: Secret<String>,
    /// Expiration as unix timestamp in seconds
    pub expires_at: u64,
}

/// Manager for the credential files in one config directory.
///
/// The store is the only component that touches these files; the token
/// provider and device flow go through it for every read and write.
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn legacy_path(&self) -> PathBuf {
        self.dir.join(LEGACY_TOKEN_FILE)
    }

    fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Save a static API key to the legacy token file, trimming whitespace.
    ///
    /// No validation of token shape — the server is the judge of that.
    pub async fn save_legacy_token(&self, token: &str) -> Result<()> {
        self.ensure_dir().await?;
        write_atomic(&self.legacy_path(), token.trim().as_bytes()).await?;
        debug!(path = %self.legacy_path().display(), "saved legacy token");
        Ok(())
    }

    /// Load the legacy token.
    ///
    /// Missing file means the user never authenticated; a file that is blank
    /// after trimming is reported separately so the fix is obvious.
    pub async fn load_legacy_token(&self) -> Result<String> {
        let path = self.legacy_path();
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotAuthenticated);
            }
            Err(e) => return Err(Error::Io(format!("reading token file: {e}"))),
        };
        let token = contents.trim();
        if token.is_empty() {
            return Err(Error::EmptyCredential);
        }
        Ok(token.to_string())
    }

    /// Persist a full credential record with `expires_at = now + ttl_secs`.
    ///
    /// Always a complete overwrite; there is no merge path.
    pub async fn save_credentials(
        &self,
        access_token: &str,
        refresh_token: &str,
        ttl_secs: u64,
    ) -> Result<()> {
        let record = CredentialRecord {
            access_token: Secret::new(access_token.to_string()),
            refresh_token: Secret::new(refresh_token.to_string()),
            expires_at: now_epoch_secs() + ttl_secs,
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| Error::CredentialParse(format!("serializing credentials: {e}")))?;

        self.ensure_dir().await?;
        write_atomic(&self.credentials_path(), json.as_bytes()).await?;
        debug!(
            path = %self.credentials_path().display(),
            expires_at = record.expires_at,
            "persisted credentials"
        );
        Ok(())
    }

    /// Load the structured record, or `None` when absent or unparseable.
    ///
    /// A corrupt file is a soft-fallback path (the token provider moves on
    /// to the legacy token), not a hard failure.
    pub async fn load_credentials(&self) -> Option<CredentialRecord> {
        let path = self.credentials_path();
        let contents = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparseable credential file");
                None
            }
        }
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Io(format!("creating config directory: {e}")))
    }
}

/// Current unix time in seconds.
pub(crate) fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Write a credential file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. This prevents corruption if the process crashes mid-write.
/// Sets file permissions to 0600 (owner read/write only) since these files
/// contain bearer secrets.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("credential");
    let tmp_path = dir.join(format!(".{name}.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, data)
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("hence"))
    }

    #[tokio::test]
    async fn legacy_roundtrip_trims_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store.save_legacy_token("  abc123  \n").await.unwrap();
        let token = store.load_legacy_token().await.unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn legacy_load_missing_file_is_not_authenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let err = store.load_legacy_token().await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated), "got: {err:?}");
    }

    #[tokio::test]
    async fn legacy_load_blank_file_is_empty_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store.save_legacy_token("   \n  ").await.unwrap();
        let err = store.load_legacy_token().await.unwrap_err();
        assert!(matches!(err, Error::EmptyCredential), "got: {err:?}");
    }

    #[tokio::test]
    async fn structured_roundtrip_computes_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store.save_credentials("A", "R", 3600).await.unwrap();
        let record = store.load_credentials().await.unwrap();

        assert_eq!(record.access_token.expose(), "A");
        assert_eq!(record.refresh_token.expose(), "R");
        let expected = now_epoch_secs() + 3600;
        assert!(
            record.expires_at.abs_diff(expected) <= 5,
            "expires_at {} not within tolerance of {expected}",
            record.expires_at
        );
    }

    #[tokio::test]
    async fn structured_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        assert!(store.load_credentials().await.is_none());
    }

    #[tokio::test]
    async fn structured_load_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        tokio::fs::create_dir_all(dir.path().join("hence"))
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("hence").join(CREDENTIALS_FILE), "not json")
            .await
            .unwrap();

        assert!(store.load_credentials().await.is_none());
    }

    #[tokio::test]
    async fn save_is_a_full_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store.save_credentials("old-a", "old-r", 100).await.unwrap();
        store.save_credentials("new-a", "new-r", 3600).await.unwrap();

        let record = store.load_credentials().await.unwrap();
        assert_eq!(record.access_token.expose(), "new-a");
        assert_eq!(record.refresh_token.expose(), "new-r");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn credential_files_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        store.save_credentials("a", "r", 60).await.unwrap();
        store.save_legacy_token("key").await.unwrap();

        for name in [CREDENTIALS_FILE, LEGACY_TOKEN_FILE] {
            let path = dir.path().join("hence").join(name);
            let mode = tokio::fs::metadata(&path)
                .await
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600, "{name} must be 0600, got {mode:o}");
        }
    }

    #[tokio::test]
    async fn record_debug_redacts_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store.save_credentials("sekrit-access", "sekrit-refresh", 60).await.unwrap();
        let record = store.load_credentials().await.unwrap();
        let debug = format!("{record:?}");
        assert!(!debug.contains("sekrit-access"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }
}
