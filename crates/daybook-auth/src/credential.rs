use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use daybook_core::AuthError;

/// Cached OAuth token bundle authorizing calendar access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    pub scopes: Vec<String>,
}

impl Credential {
    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - 300 // 5 minute buffer
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }
}

/// File-backed credential storage at an explicit path.
///
/// The path is injected rather than derived from a process-wide location so
/// each caller owns its own token file (`token.json` by default).
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the cached credential.
    ///
    /// A missing file and a malformed file are distinct errors; only the
    /// former should fall through to a fresh authorization.
    pub fn load(&self) -> Result<Credential, AuthError> {
        if !self.path.exists() {
            return Err(AuthError::CredentialNotFound(self.path.display().to_string()));
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| AuthError::Storage(format!("{}: {}", self.path.display(), e)))?;

        let credential: Credential = serde_json::from_str(&json)
            .map_err(|e| AuthError::InvalidStoredCredential(e.to_string()))?;

        tracing::debug!("Loaded credential from {}", self.path.display());
        Ok(credential)
    }

    /// Persist a credential, replacing any previous one.
    pub fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        fs::write(&self.path, &json)
            .map_err(|e| AuthError::Storage(format!("{}: {}", self.path.display(), e)))?;

        tracing::info!("Stored credential at {}", self.path.display());
        Ok(())
    }

    /// Delete the stored credential, if any.
    pub fn delete(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| AuthError::Storage(format!("{}: {}", self.path.display(), e)))?;
            tracing::info!("Deleted credential at {}", self.path.display());
        }
        Ok(())
    }
}

/// OAuth client secret, as downloaded from the Google Cloud console for an
/// "installed" (desktop) application.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: ClientSecret,
}

impl ClientSecret {
    /// Load from a `credentials.json` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| AuthError::ClientSecret(format!("{}: {}", path.display(), e)))?;

        let file: ClientSecretFile = serde_json::from_str(&json)
            .map_err(|e| AuthError::ClientSecret(format!("{}: {}", path.display(), e)))?;

        Ok(file.installed)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_credential_expiry() {
        let now = chrono::Utc::now().timestamp();

        // Expired token
        let expired = Credential {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at: now - 3600, // 1 hour ago
            scopes: vec![],
        };
        assert!(expired.is_expired());
        assert!(expired.needs_refresh());

        // Valid token
        let valid = Credential {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at: now + 3600, // 1 hour from now
            scopes: vec![],
        };
        assert!(!valid.is_expired());
        assert!(!valid.needs_refresh());

        // Needs refresh soon
        let soon = Credential {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at: now + 200, // 3 minutes from now
            scopes: vec![],
        };
        assert!(!soon.is_expired());
        assert!(soon.needs_refresh());
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("token.json"));

        let credential = Credential {
            access_token: "abc".to_string(),
            refresh_token: Some("xyz".to_string()),
            expires_at: 12345,
            scopes: vec![crate::CALENDAR_SCOPE.to_string()],
        };

        store.save(&credential).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.access_token, "abc");
        assert_eq!(loaded.refresh_token, Some("xyz".to_string()));
        assert_eq!(loaded.expires_at, 12345);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("token.json"));

        let result = store.load();
        assert!(matches!(result, Err(AuthError::CredentialNotFound(_))));
    }

    #[test]
    fn test_malformed_file_is_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = CredentialStore::new(&path);
        let result = store.load();
        assert!(matches!(result, Err(AuthError::InvalidStoredCredential(_))));
    }

    #[test]
    fn test_client_secret_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"installed": {"client_id": "id123", "client_secret": "sec456", "redirect_uris": ["http://localhost"]}}"#,
        )
        .unwrap();

        let secret = ClientSecret::load(&path).unwrap();
        assert_eq!(secret.client_id, "id123");
        assert_eq!(secret.client_secret, "sec456");
    }
}
