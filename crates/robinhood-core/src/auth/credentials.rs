use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DeviceToken;
use crate::config::ClientConfig;
use crate::Result;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Prefix shared by every token file; the profile name follows it.
const FILE_PREFIX: &str = "robinhood";
const FILE_EXTENSION: &str = "token";

/// Tokens from a successful password grant.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub device_token: DeviceToken,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

impl TokenSet {
    /// Value for the Authorization header, e.g. `Bearer <token>`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("token_type", &self.token_type)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("device_token", &self.device_token)
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// One token file per profile in a per-user directory.
///
/// There is no locking: the last writer wins. Fine for a single process
/// logging in once at a time.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(config.token_dir()?))
    }

    pub fn file_name(profile: &str) -> String {
        format!("{}{}.{}", FILE_PREFIX, profile, FILE_EXTENSION)
    }

    pub fn path_for(&self, profile: &str) -> PathBuf {
        self.dir.join(Self::file_name(profile))
    }

    pub fn exists(&self, profile: &str) -> bool {
        self.path_for(profile).exists()
    }

    /// Load the stored tokens, `Ok(None)` when the profile has none.
    pub fn load(&self, profile: &str) -> Result<Option<TokenSet>> {
        let path = self.path_for(profile);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let tokens: TokenSet = serde_json::from_slice(&bytes)?;
        debug!(path = %path.display(), "Loaded stored tokens");
        Ok(Some(tokens))
    }

    pub fn save(&self, profile: &str, tokens: &TokenSet) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(profile);
        let bytes = serde_json::to_vec(tokens)?;
        std::fs::write(&path, bytes)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        debug!(path = %path.display(), "Saved tokens");
        Ok(())
    }

    /// Remove the profile's token file; a missing file is not an error.
    pub fn delete(&self, profile: &str) -> Result<()> {
        let path = self.path_for(profile);
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!(path = %path.display(), "Deleted stored tokens");
        }
        Ok(())
    }
}
