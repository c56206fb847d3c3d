#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use robinhood_core::{ClientConfig, CredentialStore, DeviceToken, Prompter, RobinhoodClient, TokenSet};
use serde_json::{json, Value};
use wiremock::MockServer;

/// Build a client pointed at the mock server, storing tokens under `token_dir`.
pub fn client_for(server: &MockServer, token_dir: &Path) -> RobinhoodClient {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_token_dir(token_dir);
    RobinhoodClient::new(config).unwrap()
}

/// Save a token file for the default profile and return it.
pub fn store_tokens(token_dir: &Path, access_token: &str) -> TokenSet {
    let tokens = TokenSet {
        token_type: "Bearer".to_string(),
        access_token: access_token.to_string(),
        refresh_token: Some("stored-refresh".to_string()),
        device_token: DeviceToken::generate(),
        saved_at: chrono::Utc::now(),
    };
    CredentialStore::new(token_dir).save("", &tokens).unwrap();
    tokens
}

pub fn token_body(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 86400,
        "refresh_token": "fresh-refresh",
        "scope": "internal",
        "backup_code": null
    })
}

/// Answers prompts from a fixed script and records what was asked.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    fn next(&self, message: &str) -> io::Result<String> {
        self.asked.lock().unwrap().push(message.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&self, message: &str) -> io::Result<String> {
        self.next(message)
    }

    fn read_secret(&self, message: &str) -> io::Result<String> {
        self.next(message)
    }
}
