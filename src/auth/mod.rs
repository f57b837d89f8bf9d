//! GitHub OAuth device-code flow and Copilot token exchange.

pub mod device_code;
pub mod github_copilot;
pub mod token;

pub use device_code::{
    DeviceAuthorization, DeviceCodePoll, PollState, MAX_DEVICE_CODE_LIFETIME, MAX_POLL_INTERVAL,
};
pub use github_copilot::GitHubCopilotAuth;
pub use token::{AccessToken, ServiceToken};

use crate::config::ClientConfig;
use crate::transport::HttpRequest;

/// JSON content negotiation plus the client user-agent.
pub(crate) fn with_json_headers(request: HttpRequest, config: &ClientConfig) -> HttpRequest {
    request
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .header("User-Agent", &config.user_agent)
}

/// User-agent and editor/plugin identity headers the Copilot API expects.
pub(crate) fn with_editor_identity(request: HttpRequest, config: &ClientConfig) -> HttpRequest {
    request
        .header("User-Agent", &config.user_agent)
        .header("Editor-Version", &config.editor_version)
        .header("Editor-Plugin-Version", &config.editor_plugin_version)
}
