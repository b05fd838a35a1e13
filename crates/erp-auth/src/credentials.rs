//! Credential storage for the session token pair
//!
//! Persists the single access/refresh pair to a JSON file. All writes use
//! atomic temp-file + rename to prevent corruption on crash, and the file is
//! 0600 since it holds live tokens. A tokio Mutex serializes writes from
//! login, refresh, and session termination.
//!
//! The pair is always replaced as a unit. There is no code path that stores
//! a new access token while keeping an old refresh token, or vice versa.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// The signed-in user's token pair.
///
/// `expires` is a unix timestamp in milliseconds (absolute, not a delta).
/// Computed at storage time from the backend's `expiresIn` seconds delta
/// plus the current time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Scheme for the Authorization header, "Bearer" in practice
    pub token_type: String,
    /// Current access token, attached to every authenticated request
    pub access_token: String,
    /// Refresh token for obtaining the next pair
    pub refresh_token: String,
    /// Expiration as unix timestamp in milliseconds
    pub expires: u64,
}

/// Thread-safe credential file manager.
///
/// Holds at most one credential pair. Reads acquire the lock briefly to
/// clone the in-memory state, so request-time reads don't block on writes.
pub struct CredentialStore {
    path: PathBuf,
    state: Mutex<Option<Credential>>,
}

impl CredentialStore {
    /// Load the credential pair from the given file path.
    ///
    /// If the file doesn't exist, creates it holding `null` (signed-out
    /// state). Requests made before a login go out without an Authorization
    /// header.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading credential file: {e}")))?;
            let credential: Option<Credential> = serde_json::from_str(&contents)
                .map_err(|e| Error::CredentialParse(format!("parsing credential file: {e}")))?;
            info!(
                path = %path.display(),
                signed_in = credential.is_some(),
                "loaded credential file"
            );
            credential
        } else {
            info!(path = %path.display(), "credential file not found, starting signed out");
            // Create the file so future loads don't need the cold-start path
            write_atomic(&path, &None).await?;
            None
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Get a clone of the stored pair, if signed in.
    pub async fn get(&self) -> Option<Credential> {
        let state = self.state.lock().await;
        state.clone()
    }

    /// Replace the stored pair and persist to disk.
    ///
    /// Used by login and by a successful token refresh. Both tokens are
    /// swapped together.
    pub async fn set(&self, credential: Credential) -> Result<()> {
        let mut state = self.state.lock().await;
        *state = Some(credential);
        debug!("stored credential pair");
        write_atomic(&self.path, &state).await
    }

    /// Discard the stored pair and persist the signed-out state.
    ///
    /// Clearing an already-empty store is a no-op, so concurrent session
    /// terminations are safe.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.is_none() {
            return Ok(());
        }
        *state = None;
        debug!("cleared credential pair");
        write_atomic(&self.path, &state).await
    }

    /// Whether no pair is stored.
    pub async fn is_empty(&self) -> bool {
        let state = self.state.lock().await;
        state.is_none()
    }
}

/// Write the credential state to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. This prevents corruption if the process crashes mid-write.
/// Sets file permissions to 0600 (owner read/write only) since the file
/// contains live tokens.
async fn write_atomic(path: &Path, data: &Option<Credential>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::CredentialParse(format!("serializing credential: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credentials.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
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

    debug!(path = %path.display(), "persisted credential state");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credential(suffix: &str) -> Credential {
        Credential {
            token_type: "Bearer".into(),
            access_token: format!("at_{suffix}"),
            refresh_token: format!("rt_{suffix}"),
            expires: 1735500000000,
        }
    }

    #[tokio::test]
    async fn roundtrip_set_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = CredentialStore::load(path.clone()).await.unwrap();
        store.set(test_credential("1")).await.unwrap();

        // Load into a new store instance
        let store2 = CredentialStore::load(path).await.unwrap();
        let cred = store2.get().await.unwrap();
        assert_eq!(cred.access_token, "at_1");
        assert_eq!(cred.refresh_token, "rt_1");
        assert_eq!(cred.token_type, "Bearer");
    }

    #[tokio::test]
    async fn cold_start_creates_signed_out_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        assert!(!path.exists());
        let store = CredentialStore::load(path.clone()).await.unwrap();
        assert!(store.is_empty().await);
        assert!(path.exists());

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: Option<Credential> = serde_json::from_str(&contents).unwrap();
        assert!(parsed.is_none());
    }

    #[tokio::test]
    async fn set_replaces_the_whole_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = CredentialStore::load(path).await.unwrap();
        store.set(test_credential("old")).await.unwrap();
        store.set(test_credential("new")).await.unwrap();

        let cred = store.get().await.unwrap();
        assert_eq!(cred.access_token, "at_new");
        assert_eq!(cred.refresh_token, "rt_new");
    }

    #[tokio::test]
    async fn clear_is_idempotent_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = CredentialStore::load(path.clone()).await.unwrap();
        store.set(test_credential("1")).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.is_empty().await);

        // A second clear on an empty store is a no-op
        store.clear().await.unwrap();
        assert!(store.is_empty().await);

        let store2 = CredentialStore::load(path).await.unwrap();
        assert!(store2.is_empty().await);
    }

    #[tokio::test]
    async fn camel_case_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = CredentialStore::load(path.clone()).await.unwrap();
        store.set(test_credential("1")).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("\"accessToken\""));
        assert!(contents.contains("\"refreshToken\""));
        assert!(contents.contains("\"tokenType\""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = CredentialStore::load(path.clone()).await.unwrap();
        store.set(test_credential("1")).await.unwrap();

        let metadata = tokio::fs::metadata(&path).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "credential file must be 0600, got {mode:o}");
    }

    #[tokio::test]
    async fn concurrent_writes_dont_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = std::sync::Arc::new(CredentialStore::load(path.clone()).await.unwrap());

        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set(test_credential(&i.to_string())).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // File holds one of the written pairs, and is valid JSON
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: Option<Credential> = serde_json::from_str(&contents).unwrap();
        assert!(parsed.is_some());
    }
}
