//! Configuration (layered: defaults > config file > env).
//!
//! [`ClientConfig`] is an immutable value handed to every component, so
//! tests can point the whole flow at mocked endpoints.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CopilotError, Result};

pub const DEFAULT_CLIENT_ID: &str = "Iv1.b507a08c87ecfe98";
pub const DEFAULT_SCOPE: &str = "read:user";
pub const DEFAULT_DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
pub const DEFAULT_ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const DEFAULT_COPILOT_TOKEN_URL: &str = "https://api.github.com/copilot_internal/v2/token";
pub const DEFAULT_MANIFEST_URL: &str = "https://models.dev/api.json";
pub const DEFAULT_MANIFEST_PROVIDER: &str = "github-copilot";

pub const COPILOT_USER_AGENT: &str = "GitHubCopilotChat/0.26.7";
pub const COPILOT_EDITOR_VERSION: &str = "vscode/1.99.3";
pub const COPILOT_EDITOR_PLUGIN_VERSION: &str = "copilot-chat/0.26.7";
pub const MANIFEST_USER_AGENT: &str = "opencode-models-sample/0.0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const SLOW_DOWN_INCREMENT_SECS: u64 = 5;

/// Endpoints, identity headers, and timing knobs for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub scope: String,
    pub device_code_url: String,
    pub access_token_url: String,
    pub copilot_token_url: String,
    pub manifest_url: String,
    pub manifest_provider: String,
    pub user_agent: String,
    pub editor_version: String,
    pub editor_plugin_version: String,
    pub manifest_user_agent: String,
    pub request_timeout: Duration,
    pub default_poll_interval: Duration,
    pub slow_down_increment: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            access_token_url: DEFAULT_ACCESS_TOKEN_URL.to_string(),
            copilot_token_url: DEFAULT_COPILOT_TOKEN_URL.to_string(),
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            manifest_provider: DEFAULT_MANIFEST_PROVIDER.to_string(),
            user_agent: COPILOT_USER_AGENT.to_string(),
            editor_version: COPILOT_EDITOR_VERSION.to_string(),
            editor_plugin_version: COPILOT_EDITOR_PLUGIN_VERSION.to_string(),
            manifest_user_agent: MANIFEST_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            slow_down_increment: Duration::from_secs(SLOW_DOWN_INCREMENT_SECS),
        }
    }
}

/// Optional overrides read from `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    client_id: Option<String>,
    scope: Option<String>,
    device_code_url: Option<String>,
    access_token_url: Option<String>,
    copilot_token_url: Option<String>,
    manifest_url: Option<String>,
    manifest_provider: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = url.into();
        self
    }

    pub fn with_copilot_token_url(mut self, url: impl Into<String>) -> Self {
        self.copilot_token_url = url.into();
        self
    }

    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Point every authorization endpoint at one base URL (used with mock servers).
    pub fn with_auth_base_url(self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.with_device_code_url(format!("{base}/login/device/code"))
            .with_access_token_url(format!("{base}/login/oauth/access_token"))
            .with_copilot_token_url(format!("{base}/copilot_internal/v2/token"))
    }

    /// Parse overrides from TOML text on top of the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let config = Self::default().apply_file(file);
        config.validate()?;
        Ok(config)
    }

    /// Load overrides from a TOML file on top of the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// `<config dir>/copilot-probe/config.toml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "copilot-probe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from environment variables only (after reading `.env` if present).
    pub fn from_env() -> Result<Self> {
        Self::default().overlay_env()
    }

    /// Defaults, then the config file at [`ClientConfig::default_path`], then env.
    pub fn resolve() -> Result<Self> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::load(&path)?
            }
            _ => Self::default(),
        };
        base.overlay_env()
    }

    fn overlay_env(self) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let config = self.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(mut self, file: ConfigFile) -> Self {
        if let Some(v) = file.client_id {
            self.client_id = v;
        }
        if let Some(v) = file.scope {
            self.scope = v;
        }
        if let Some(v) = file.device_code_url {
            self.device_code_url = v;
        }
        if let Some(v) = file.access_token_url {
            self.access_token_url = v;
        }
        if let Some(v) = file.copilot_token_url {
            self.copilot_token_url = v;
        }
        if let Some(v) = file.manifest_url {
            self.manifest_url = v;
        }
        if let Some(v) = file.manifest_provider {
            self.manifest_provider = v;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        self
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string_mappings: [(&str, &mut String); 6] = [
            ("COPILOT_PROBE_CLIENT_ID", &mut self.client_id),
            ("COPILOT_PROBE_DEVICE_CODE_URL", &mut self.device_code_url),
            ("COPILOT_PROBE_ACCESS_TOKEN_URL", &mut self.access_token_url),
            ("COPILOT_PROBE_COPILOT_TOKEN_URL", &mut self.copilot_token_url),
            ("COPILOT_PROBE_MANIFEST_URL", &mut self.manifest_url),
            ("COPILOT_PROBE_MANIFEST_PROVIDER", &mut self.manifest_provider),
        ];
        for (key, slot) in string_mappings {
            if let Some(value) = lookup(key) {
                *slot = value;
            }
        }
        if let Some(raw) = lookup("COPILOT_PROBE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CopilotError::Configuration(format!(
                    "COPILOT_PROBE_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            self.request_timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("device_code_url", &self.device_code_url),
            ("access_token_url", &self.access_token_url),
            ("copilot_token_url", &self.copilot_token_url),
            ("manifest_url", &self.manifest_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CopilotError::Configuration(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.request_timeout < Duration::from_secs(1) {
            return Err(CopilotError::Configuration(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.default_poll_interval < Duration::from_secs(1) {
            return Err(CopilotError::Configuration(
                "poll interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_github_endpoints() {
        let config = ClientConfig::default();
        assert_eq!(config.client_id, "Iv1.b507a08c87ecfe98");
        assert_eq!(config.scope, "read:user");
        assert_eq!(config.slow_down_increment, Duration::from_secs(5));
        assert_eq!(config.default_poll_interval, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = ClientConfig::from_toml_str(
            r#"
            client_id = "Iv1.custom"
            request_timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.client_id, "Iv1.custom");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.device_code_url, DEFAULT_DEVICE_CODE_URL);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = ClientConfig::from_toml_str("clientid = \"typo\"").unwrap_err();
        assert!(matches!(err, CopilotError::Configuration(_)));
    }

    #[test]
    fn toml_rejects_non_http_urls() {
        let err = ClientConfig::from_toml_str("device_code_url = \"ftp://example\"").unwrap_err();
        assert!(err.to_string().contains("device_code_url"));
    }

    #[test]
    fn env_overrides_urls_and_timeout() {
        let vars: HashMap<&str, &str> = [
            ("COPILOT_PROBE_ACCESS_TOKEN_URL", "http://127.0.0.1:9/token"),
            ("COPILOT_PROBE_TIMEOUT_SECS", "7"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::default()
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.access_token_url, "http://127.0.0.1:9/token");
        assert_eq!(config.request_timeout, Duration::from_secs(7));
    }

    #[test]
    fn env_rejects_bad_timeout() {
        let err = ClientConfig::default()
            .apply_env(|key| (key == "COPILOT_PROBE_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("COPILOT_PROBE_TIMEOUT_SECS"));
    }

    #[test]
    fn auth_base_url_rewrites_all_auth_endpoints() {
        let config = ClientConfig::default().with_auth_base_url("http://localhost:1234/");
        assert_eq!(
            config.device_code_url,
            "http://localhost:1234/login/device/code"
        );
        assert_eq!(
            config.access_token_url,
            "http://localhost:1234/login/oauth/access_token"
        );
        assert_eq!(
            config.copilot_token_url,
            "http://localhost:1234/copilot_internal/v2/token"
        );
    }
}
