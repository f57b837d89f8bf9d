use std::fmt;

use chrono::{DateTime, Utc};

/// GitHub OAuth access token. Held only in memory and handed straight to
/// the Copilot token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"<redacted>").finish()
    }
}

/// Short-lived Copilot API token plus the API base it is valid for.
///
/// `expires_at` and `refresh_in` are informational; nothing enforces them.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceToken {
    pub token: String,
    pub api_base: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_in: Option<u64>,
}

impl ServiceToken {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: api_base.into(),
            expires_at: None,
            refresh_in: None,
        }
    }

    /// Join a path onto the API base without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

impl fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceToken")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("expires_at", &self.expires_at)
            .field("refresh_in", &self.refresh_in)
            .finish()
    }
}

/// Parse `expires_at` given as unix seconds or milliseconds, number or string.
pub(crate) fn parse_expires_at(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let raw = value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))?;
    let secs = if raw > 10_000_000_000 { raw / 1000 } else { raw };
    DateTime::<Utc>::from_timestamp(secs, 0)
}
