//! Login and logout.
//!
//! A login first tries the token file of the requested profile: the stored
//! access token is put on the session and checked against the positions
//! endpoint. If that fails the password grant runs, answering an MFA prompt
//! or an SMS/email challenge when the server asks for one.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::credentials::{CredentialStore, TokenSet};
use super::device::DeviceToken;
use super::prompt::Prompter;
use super::session::CHALLENGE_RESPONSE_HEADER;
use crate::api::Transport;
use crate::urls::Urls;
use crate::{Error, Result};

const AUTHORIZATION: &str = "Authorization";

/// Access tokens are requested for one day by default.
const DEFAULT_EXPIRES_IN: u64 = 86400;

const DEFAULT_SCOPE: &str = "internal";

#[derive(Clone)]
pub struct LoginOptions {
    /// Prompted for when missing.
    pub username: Option<String>,
    /// Prompted for (hidden) when missing.
    pub password: Option<String>,
    /// Requested token lifetime in seconds.
    pub expires_in: u64,
    pub scope: String,
    /// Send verification challenges by SMS, otherwise by email.
    pub by_sms: bool,
    /// Reuse and save the profile's token file. When false an existing file
    /// is deleted.
    pub store_session: bool,
    /// Sent with the first password grant.
    pub mfa_code: Option<String>,
    /// Names the token file, so several accounts can stay logged in.
    pub profile: String,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            expires_in: DEFAULT_EXPIRES_IN,
            scope: DEFAULT_SCOPE.to_string(),
            by_sms: true,
            store_session: true,
            mfa_code: None,
            profile: String::new(),
        }
    }
}

impl std::fmt::Debug for LoginOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOptions")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("by_sms", &self.by_sms)
            .field("store_session", &self.store_session)
            .field("mfa_code", &self.mfa_code.as_ref().map(|_| "[REDACTED]"))
            .field("profile", &self.profile)
            .finish()
    }
}

impl LoginOptions {
    pub fn with_credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    fn challenge_type(&self) -> &'static str {
        if self.by_sms {
            "sms"
        } else {
            "email"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginSource {
    /// The stored token was still valid; no password grant was sent.
    CachedToken,
    /// A new token came from the password grant.
    PasswordGrant,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
    pub backup_code: Option<String>,
    pub detail: String,
    pub source: LoginSource,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token_type", &self.token_type)
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("detail", &self.detail)
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
    backup_code: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Drives login and logout for one transport.
#[derive(Debug, Clone)]
pub struct Authenticator {
    transport: Transport,
    store: CredentialStore,
    urls: Urls,
    client_id: String,
}

impl Authenticator {
    pub fn new(transport: Transport, store: CredentialStore, urls: Urls, client_id: String) -> Self {
        Self {
            transport,
            store,
            urls,
            client_id,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub async fn login(&self, options: &LoginOptions, prompter: &dyn Prompter) -> Result<LoginResponse> {
        self.transport.set_closed(false).await;

        let profile = options.profile.as_str();
        let mut device_token = DeviceToken::generate();

        if self.store.exists(profile) {
            if options.store_session {
                match self.store.load(profile) {
                    Ok(Some(tokens)) => {
                        // Keep the device identity of the first login
                        device_token = tokens.device_token.clone();
                        match self.check_stored_tokens(&tokens).await {
                            Ok(()) => {
                                info!(profile, "Logged in with stored token");
                                return Ok(self.stored_login_response(tokens, options));
                            }
                            Err(e) => {
                                error!(
                                    error = %e,
                                    "There was an issue loading the token file. Authentication may be expired - logging in normally."
                                );
                                self.transport.set_login_state(false).await;
                                self.transport.update_session(AUTHORIZATION, None).await?;
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(error = %e, "Could not read token file - logging in normally.");
                    }
                }
            } else {
                self.store.delete(profile)?;
            }
        }

        let username = match options.username {
            Some(ref username) => username.clone(),
            None => prompter.read_line("Robinhood username: ")?,
        };
        let password = match options.password {
            Some(ref password) => password.clone(),
            None => prompter.read_secret("Robinhood password: ")?,
        };

        let mut payload = json!({
            "client_id": self.client_id,
            "expires_in": options.expires_in,
            "grant_type": "password",
            "password": password,
            "scope": options.scope,
            "username": username,
            "challenge_type": options.challenge_type(),
            "device_token": device_token.as_str(),
        });
        if let Some(ref code) = options.mfa_code {
            payload["mfa_code"] = Value::String(code.clone());
        }

        let url = self.urls.login();
        debug!(url = %url, "Requesting password grant");
        let mut data = self.request_token(&url, &payload).await?;

        if data.get("mfa_required").is_some() {
            data = self.answer_mfa(&url, &mut payload, prompter).await?;
        } else if let Some(challenge) = data.get("challenge") {
            let challenge_id = challenge
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::InvalidResponse("challenge has no id".to_string()))?
                .to_string();
            self.answer_challenge(&challenge_id, prompter).await?;
            self.transport
                .update_session(CHALLENGE_RESPONSE_HEADER, Some(&challenge_id))
                .await?;
            data = self.request_token(&url, &payload).await?;
        }

        if data.get("access_token").is_none() {
            let detail = data
                .get("detail")
                .and_then(Value::as_str)
                .unwrap_or("no access token in response")
                .to_string();
            return Err(Error::Authentication(detail));
        }

        let token: TokenResponse = serde_json::from_value(data)?;
        let authorization = format!("{} {}", token.token_type, token.access_token);
        self.transport
            .update_session(AUTHORIZATION, Some(&authorization))
            .await?;
        self.transport.set_login_state(true).await;

        if options.store_session {
            let tokens = TokenSet {
                token_type: token.token_type.clone(),
                access_token: token.access_token.clone(),
                refresh_token: token.refresh_token.clone(),
                device_token,
                saved_at: chrono::Utc::now(),
            };
            if let Err(e) = self.store.save(profile, &tokens) {
                warn!(error = %e, "Failed to save tokens");
            }
        }

        info!(profile, "Logged in with new access token");
        Ok(LoginResponse {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            scope: token.scope,
            refresh_token: token.refresh_token,
            backup_code: token.backup_code,
            detail: "logged in with brand new authentication code.".to_string(),
            source: LoginSource::PasswordGrant,
        })
    }

    /// Drop the Authorization header, clear the login flag and close the
    /// session.
    pub async fn logout(&self) -> Result<()> {
        self.transport.require_login("logout").await?;
        self.transport.set_login_state(false).await;
        self.transport.update_session(AUTHORIZATION, None).await?;
        self.transport.set_closed(true).await;
        info!("Logged out");
        Ok(())
    }

    async fn check_stored_tokens(&self, tokens: &TokenSet) -> Result<()> {
        self.transport.set_login_state(true).await;
        self.transport
            .update_session(AUTHORIZATION, Some(&tokens.authorization()))
            .await?;
        self.transport
            .get_checked(&self.urls.positions(), &[("nonzero", "true")])
            .await?;
        Ok(())
    }

    fn stored_login_response(&self, tokens: TokenSet, options: &LoginOptions) -> LoginResponse {
        let path = self.store.path_for(&options.profile);
        LoginResponse {
            access_token: tokens.access_token,
            token_type: tokens.token_type,
            expires_in: Some(options.expires_in),
            scope: Some(options.scope.clone()),
            refresh_token: tokens.refresh_token,
            backup_code: None,
            detail: format!("logged in using authentication in {}", path.display()),
            source: LoginSource::CachedToken,
        }
    }

    /// POST the grant; no response at all is a connectivity failure.
    async fn request_token(&self, url: &str, payload: &Value) -> Result<Value> {
        match self.transport.post(url, Some(payload), false).await {
            Ok(Some(data)) => Ok(data),
            Ok(None) => Err(Error::Connectivity(
                "empty response from token endpoint".to_string(),
            )),
            Err(e) if e.is_connectivity() => Err(Error::Connectivity(e.to_string())),
            Err(e) => Err(e),
        }
    }

    async fn answer_mfa(
        &self,
        url: &str,
        payload: &mut Value,
        prompter: &dyn Prompter,
    ) -> Result<Value> {
        let mut code = prompter.read_line("Please type in the MFA code: ")?;
        loop {
            payload["mfa_code"] = Value::String(code);
            let response = self.transport.post_response(url, Some(payload), false).await?;
            if response.is_success() {
                return response.body.ok_or_else(|| {
                    Error::Connectivity("empty response to MFA code".to_string())
                });
            }
            debug!(status = response.status, "MFA code rejected");
            code = prompter.read_line("That MFA code was not correct. Please type in another MFA code: ")?;
        }
    }

    async fn answer_challenge(&self, challenge_id: &str, prompter: &dyn Prompter) -> Result<()> {
        let url = self.urls.challenge(challenge_id);
        let mut code = prompter.read_line("Enter Robinhood code for validation: ")?;
        loop {
            let response = self
                .transport
                .post(&url, Some(&json!({ "response": code })), false)
                .await?;
            let remaining = response
                .as_ref()
                .and_then(|r| r.get("challenge"))
                .map(|c| c.get("remaining_attempts").and_then(Value::as_u64).unwrap_or(0));

            match remaining {
                None => return Ok(()),
                Some(0) => {
                    return Err(Error::Authentication(
                        "verification code attempts exhausted".to_string(),
                    ))
                }
                Some(remaining) => {
                    code = prompter.read_line(&format!(
                        "That code was not correct. {} tries remaining. Please type in another code: ",
                        remaining
                    ))?;
                }
            }
        }
    }
}
