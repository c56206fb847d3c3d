use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::{Error, Result};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Header carrying the id of a challenge the user just answered.
pub const CHALLENGE_RESPONSE_HEADER: &str = "X-ROBINHOOD-CHALLENGE-RESPONSE-ID";

const API_VERSION_HEADER: &str = "X-Robinhood-API-Version";

/// Mutable request state shared by every call a client makes.
///
/// Lives for as long as the client; nothing here is persisted. The
/// authenticator writes the Authorization header and the login flag, the
/// transport reads the headers for each request.
pub struct Session {
    headers: HeaderMap,
    logged_in: bool,
    closed: bool,
}

impl Session {
    pub fn new(api_version: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=1"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(FORM_CONTENT_TYPE),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static("*"));
        if let Ok(value) = HeaderValue::from_str(api_version) {
            headers.insert(HeaderName::from_static("x-robinhood-api-version"), value);
        } else {
            tracing::warn!(header = API_VERSION_HEADER, "Ignoring invalid API version");
        }

        Self {
            headers,
            logged_in: false,
            closed: false,
        }
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::InvalidHeader(name.to_string()))?;
        let mut value =
            HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(name.to_string()))?;
        if name == header::AUTHORIZATION {
            value.set_sensitive(true);
        }
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.headers.keys().map(|k| k.as_str()).collect();
        f.debug_struct("Session")
            .field("headers", &names)
            .field("authorization", &self.headers.contains_key(header::AUTHORIZATION).then_some("[REDACTED]"))
            .field("logged_in", &self.logged_in)
            .field("closed", &self.closed)
            .finish()
    }
}
