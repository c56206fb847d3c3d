//! Client configuration.
//!
//! Holds the API host, the OAuth client id sent with password grants, the
//! API version header and the POST timeout. Tokens are stored under
//! `~/.config/robinhood/tokens` unless `token_dir` overrides it.

use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

/// Application name used for the config directory path
const APP_NAME: &str = "robinhood";

/// Sub-directory holding one token file per profile
const TOKEN_DIR: &str = "tokens";

pub const DEFAULT_API_BASE_URL: &str = "https://api.robinhood.com";

/// Public client id of the Robinhood web app.
pub const DEFAULT_CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

pub const DEFAULT_API_VERSION: &str = "1.431.4";

/// POST requests time out after 16 seconds; GET requests have no timeout.
const POST_TIMEOUT_SECS: u64 = 16;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub client_id: String,
    pub api_version: String,
    pub post_timeout: Duration,
    pub token_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            post_timeout: Duration::from_secs(POST_TIMEOUT_SECS),
            token_dir: None,
        }
    }
}

impl ClientConfig {
    /// Point the client at a different host (mock servers, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = Some(dir.into());
        self
    }

    /// Directory where token files live.
    pub fn token_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.token_dir {
            return Ok(dir.clone());
        }
        let config_dir = dirs::config_dir().ok_or(Error::NoConfigDirectory)?;
        Ok(config_dir.join(APP_NAME).join(TOKEN_DIR))
    }
}
