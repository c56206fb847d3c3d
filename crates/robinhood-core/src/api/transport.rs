//! HTTP transport for the Robinhood REST API.
//!
//! Every request carries the shared session headers. GET and DELETE never
//! fail: errors are logged and an empty or absent value is returned instead.
//! POST surfaces errors because it changes server state.

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::auth::session::{Session, JSON_CONTENT_TYPE};
use crate::config::ClientConfig;
use crate::{Error, Result};

/// Statuses a POST treats as a normal answer. Anything else is an error.
pub const ACCEPTED_POST_STATUSES: [u16; 13] =
    [200, 201, 202, 204, 301, 302, 303, 304, 307, 400, 401, 402, 403];

/// How a successful GET body is shaped before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GetMode {
    /// The body as-is.
    #[default]
    Regular,
    /// `body.results`.
    Results,
    /// `body.results` of every page, following `body.next`.
    Pagination,
    /// `body.results[0]`.
    IndexZero,
}

impl GetMode {
    /// What a failed request returns in this mode.
    pub fn empty(self) -> Option<Value> {
        match self {
            GetMode::Results | GetMode::Pagination => Some(Value::Array(Vec::new())),
            GetMode::Regular | GetMode::IndexZero => None,
        }
    }
}

/// Status and parsed body of a POST.
#[derive(Debug, Clone)]
pub struct PostResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl PostResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Issues requests on behalf of one client. Clone is cheap: the HTTP client
/// and the session are shared.
#[derive(Clone)]
pub struct Transport {
    http: Client,
    session: Arc<RwLock<Session>>,
    config: Arc<ClientConfig>,
}

impl Transport {
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let http = Client::builder().build()?;
        let session = Session::new(&config.api_version);
        Ok(Self {
            http,
            session: Arc::new(RwLock::new(session)),
            config,
        })
    }

    // ===== Session access =====

    /// Set a session header, or remove it when `value` is `None`.
    pub async fn update_session(&self, name: &str, value: Option<&str>) -> Result<()> {
        let mut session = self.session.write().await;
        match value {
            Some(value) => session.set_header(name, value),
            None => {
                session.remove_header(name);
                Ok(())
            }
        }
    }

    pub async fn session_header(&self, name: &str) -> Option<String> {
        self.session.read().await.header(name).map(str::to_string)
    }

    pub async fn set_login_state(&self, logged_in: bool) {
        self.session.write().await.set_logged_in(logged_in);
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_logged_in()
    }

    /// Fail fast with [`Error::LoginRequired`] naming `operation`.
    pub async fn require_login(&self, operation: &'static str) -> Result<()> {
        if self.is_logged_in().await {
            Ok(())
        } else {
            Err(Error::LoginRequired(operation))
        }
    }

    pub(crate) async fn set_closed(&self, closed: bool) {
        self.session.write().await.set_closed(closed);
    }

    pub async fn is_closed(&self) -> bool {
        self.session.read().await.is_closed()
    }

    async fn request_headers(&self) -> Result<HeaderMap> {
        let session = self.session.read().await;
        if session.is_closed() {
            return Err(Error::SessionClosed);
        }
        Ok(session.headers().clone())
    }

    // ===== GET =====

    /// GET `url` and shape the body according to `mode`.
    ///
    /// Never fails: any error is logged and `mode.empty()` is returned.
    /// Pagination keeps the pages it already has when a later page fails.
    pub async fn get(&self, url: &str, mode: GetMode, params: &[(&str, &str)]) -> Option<Value> {
        let body = match self.get_checked(url, params).await {
            Ok(body) => body,
            Err(e) => {
                error!(url = %url, error = %e, "GET request failed");
                return mode.empty();
            }
        };

        match mode {
            GetMode::Regular => Some(body),
            GetMode::Results => match take_results(body) {
                Some(results) => Some(results),
                None => {
                    error!(url = %url, "results is not a key in the dictionary");
                    mode.empty()
                }
            },
            GetMode::IndexZero => match take_results(body) {
                Some(Value::Array(mut results)) if !results.is_empty() => {
                    Some(results.swap_remove(0))
                }
                Some(_) => None,
                None => {
                    error!(url = %url, "results is not a key in the dictionary");
                    None
                }
            },
            GetMode::Pagination => Some(self.paginate(url, body).await),
        }
    }

    async fn paginate(&self, url: &str, first_page: Value) -> Value {
        let mut next = next_page(&first_page);
        let mut records = match take_results(first_page) {
            Some(Value::Array(results)) => results,
            Some(_) => {
                error!(url = %url, "results is not a list");
                return Value::Array(Vec::new());
            }
            None => {
                error!(url = %url, "results is not a key in the dictionary");
                return Value::Array(Vec::new());
            }
        };

        let mut visited = HashSet::from([url.to_string()]);
        let mut page = 2;

        if next.is_some() {
            debug!(url = %url, "Found additional pages");
        }
        while let Some(next_url) = next.take() {
            if !visited.insert(next_url.clone()) {
                warn!(url = %next_url, "Server repeated a page cursor, stopping");
                break;
            }
            debug!(page, "Loading page");
            match self.get_checked(&next_url, &[]).await {
                Ok(body) => {
                    next = next_page(&body);
                    match take_results(body) {
                        Some(Value::Array(results)) => records.extend(results),
                        _ => {
                            warn!(url = %next_url, "Page has no results, stopping");
                            break;
                        }
                    }
                }
                Err(e) => {
                    warn!(url = %next_url, error = %e, "Additional pages exist but could not be loaded");
                    break;
                }
            }
            page += 1;
        }

        Value::Array(records)
    }

    /// GET `url` and return the JSON body, surfacing every failure.
    pub async fn get_checked(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        let headers = self.request_headers().await?;
        let mut request = self.http.get(url).headers(headers);
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(status, &body));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    // ===== POST =====

    /// POST `payload` form-encoded, or as JSON when `json` is set.
    ///
    /// The JSON content type only applies to this request; the session keeps
    /// its form-encoded default.
    pub async fn post_response(
        &self,
        url: &str,
        payload: Option<&Value>,
        json: bool,
    ) -> Result<PostResponse> {
        let mut headers = self.request_headers().await?;
        if json {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }

        let mut request = self
            .http
            .post(url)
            .headers(headers)
            .timeout(self.config.post_timeout);
        if let Some(payload) = payload {
            request = if json {
                request.json(payload)
            } else {
                request.form(payload)
            };
        }

        let response = request.send().await?;
        let status = response.status();
        if !ACCEPTED_POST_STATUSES.contains(&status.as_u16()) {
            let body = response.text().await.unwrap_or_default();
            error!(url = %url, status = status.as_u16(), "POST rejected");
            return Err(Error::from_status(status, &body));
        }

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(url = %url, error = %e, "POST response is not JSON");
                    None
                }
            }
        };

        Ok(PostResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// POST and return only the parsed body.
    pub async fn post(&self, url: &str, payload: Option<&Value>, json: bool) -> Result<Option<Value>> {
        Ok(self.post_response(url, payload, json).await?.body)
    }

    // ===== DELETE =====

    /// DELETE `url`; failures are logged and yield `None`.
    pub async fn delete(&self, url: &str) -> Option<Value> {
        match self.delete_checked(url).await {
            Ok(body) => body,
            Err(e) => {
                error!(url = %url, error = %e, "Error in DELETE request");
                None
            }
        }
    }

    async fn delete_checked(&self, url: &str) -> Result<Option<Value>> {
        let headers = self.request_headers().await?;
        let response = self.http.delete(url).headers(headers).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(status, &body));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("api_base_url", &self.config.api_base_url)
            .finish()
    }
}

fn take_results(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => map.remove("results"),
        _ => None,
    }
}

fn next_page(body: &Value) -> Option<String> {
    body.get("next")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
