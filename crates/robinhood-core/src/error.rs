use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Received status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session is closed - log in again to reopen it")]
    SessionClosed,

    #[error("Invalid value for header {0}")]
    InvalidHeader(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Trouble connecting to the Robinhood API, check internet connection: {0}")]
    Connectivity(String),

    #[error("{0} can only be called when logged in")]
    LoginRequired(&'static str),

    #[error("Could not determine a config directory for token storage")]
    NoConfigDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl Error {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => Error::Unauthorized,
            403 => Error::AccessDenied(truncated),
            404 => Error::NotFound(truncated),
            500..=599 => Error::ServerError(truncated),
            code => Error::Status {
                status: code,
                body: truncated,
            },
        }
    }

    /// True when no HTTP exchange happened at all (DNS, refused, reset, timeout).
    pub fn is_connectivity(&self) -> bool {
        match self {
            Error::Network(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Error::Connectivity(_) => true,
            _ => false,
        }
    }
}
