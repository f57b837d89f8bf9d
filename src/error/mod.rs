//! Error types for the device flow, token exchange, and chat calls.

use thiserror::Error;

/// Maximum number of characters of a response body kept in an error.
pub const BODY_PREVIEW_CHARS: usize = 200;

/// Primary error type for all copilot-probe operations.
#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("Device code request failed{}: {message}", status_suffix(.status))]
    AuthServer {
        status: Option<u16>,
        message: String,
    },

    #[error("Device flow failed: {payload}")]
    DeviceFlow { payload: String },

    #[error("Timed out waiting for device authorization after {expires_in_secs}s")]
    DeviceFlowTimeout { expires_in_secs: u64 },

    #[error("Copilot token exchange failed: {status} {body}")]
    TokenExchange { status: u16, body: String },

    #[error("Chat request to {url} failed: {status} {body}")]
    ChatRequest {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Chat request to {url} could not be sent: {message}")]
    ChatUnreachable { url: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

impl CopilotError {
    pub fn chat_request(url: impl Into<String>, status: u16, body: &str) -> Self {
        Self::ChatRequest {
            url: url.into(),
            status,
            body: truncate_body(body),
        }
    }

    pub fn token_exchange(status: u16, body: &str) -> Self {
        Self::TokenExchange {
            status,
            body: truncate_body(body),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthServer { status, .. } => *status,
            Self::TokenExchange { status, .. } | Self::ChatRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request never got an HTTP answer (connection, DNS, timeout).
    ///
    /// Server verdicts such as 4xx/5xx statuses or device-flow rejections are not.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ChatUnreachable { .. })
    }
}

/// Truncate a response body for display, respecting UTF-8 boundaries.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((end, _)) => body[..end].to_string(),
        None => body.to_string(),
    }
}

impl From<reqwest::Error> for CopilotError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<serde_json::Error> for CopilotError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for CopilotError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for CopilotError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CopilotError>;
