use std::sync::Arc;

use crate::api::Transport;
use crate::auth::{
    Authenticator, CredentialStore, LoginOptions, LoginResponse, Prompter, TerminalPrompter,
};
use crate::config::ClientConfig;
use crate::urls::Urls;
use crate::Result;

/// Entry point: one session, one transport, one token store.
/// Clone is cheap - clones share the session and connection pool.
#[derive(Debug, Clone)]
pub struct RobinhoodClient {
    transport: Transport,
    auth: Authenticator,
    urls: Urls,
}

impl RobinhoodClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store = CredentialStore::from_config(&config)?;
        Self::with_store(config, store)
    }

    pub fn with_store(config: ClientConfig, store: CredentialStore) -> Result<Self> {
        let urls = Urls::new(&config.api_base_url);
        let client_id = config.client_id.clone();
        let transport = Transport::new(Arc::new(config))?;
        let auth = Authenticator::new(transport.clone(), store, urls.clone(), client_id);
        Ok(Self {
            transport,
            auth,
            urls,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }

    pub fn credential_store(&self) -> &CredentialStore {
        self.auth.store()
    }

    /// Log in, prompting on the terminal for anything `options` leaves out.
    pub async fn login(&self, options: &LoginOptions) -> Result<LoginResponse> {
        self.auth.login(options, &TerminalPrompter).await
    }

    pub async fn login_with_prompter(
        &self,
        options: &LoginOptions,
        prompter: &dyn Prompter,
    ) -> Result<LoginResponse> {
        self.auth.login(options, prompter).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }

    pub async fn is_logged_in(&self) -> bool {
        self.transport.is_logged_in().await
    }
}
