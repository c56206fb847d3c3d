//! Endpoint URL builders.
//!
//! All URLs are absolute and end with a trailing slash, which the API
//! requires.

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Urls {
    base: String,
}

impl Urls {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    // ===== Authentication =====

    pub fn login(&self) -> String {
        self.join("oauth2/token/")
    }

    pub fn challenge(&self, challenge_id: &str) -> String {
        self.join(&format!("challenge/{}/respond/", challenge_id))
    }

    // ===== Account =====

    pub fn positions(&self) -> String {
        self.join("positions/")
    }

    pub fn account_profile(&self) -> String {
        self.join("accounts/")
    }

    // ===== Stocks =====

    pub fn quotes(&self) -> String {
        self.join("quotes/")
    }

    pub fn instruments(&self) -> String {
        self.join("instruments/")
    }

    pub fn chain(&self, chain_id: &str) -> String {
        self.join(&format!("options/chains/{}/", chain_id))
    }

    // ===== Markets =====

    pub fn markets(&self) -> String {
        self.join("markets/")
    }

    pub fn market_hours(&self, mic: &str, date: NaiveDate) -> String {
        self.join(&format!("markets/{}/hours/{}/", mic, date.format("%Y-%m-%d")))
    }

    pub fn movers_sp500(&self) -> String {
        self.join("midlands/movers/sp500/")
    }
}
