//! Chat completions against the Copilot API, with path discovery.

pub mod probe;

pub use probe::{ProbeResult, PROBE_PROMPT};

use std::sync::Arc;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::auth::{with_editor_identity, ServiceToken};
use crate::config::ClientConfig;
use crate::error::{CopilotError, Result};
use crate::transport::{HttpRequest, Transport};

/// Paths tried in order under the API base.
pub const CANDIDATE_PATHS: [&str; 2] = ["/v1/chat/completions", "/chat/completions"];

/// Message author role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Optional request knobs. Unset fields are left out of the request body.
#[derive(Debug, Clone, Default, Builder, PartialEq)]
pub struct ChatSettings {
    #[builder(into)]
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// Result of a chat call that reached the API or ran out of paths.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// `choices[0].message.content` of the first 200 response.
    Content(String),
    /// 200 with JSON that has no usable `choices`.
    UnknownShape(Value),
    /// 200 whose body is not JSON.
    NonJson(String),
    /// Every candidate path answered 404.
    NoWorkingPath,
}

impl ChatOutcome {
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            _ => None,
        }
    }

    /// Whether some path answered 200.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::NoWorkingPath)
    }
}

/// Sends chat requests with a Copilot service token.
pub struct ChatClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Deliver `messages`, walking [`CANDIDATE_PATHS`] until one is not a 404.
    ///
    /// Any status other than 200 and 404, or a failure to send, ends the
    /// call without trying further paths.
    pub async fn complete(
        &self,
        service: &ServiceToken,
        messages: &[ChatMessage],
        settings: &ChatSettings,
    ) -> Result<ChatOutcome> {
        let body = serde_json::to_value(ChatRequestBody {
            model: settings.model.as_deref(),
            messages,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })?;

        for path in CANDIDATE_PATHS {
            let url = service.endpoint(path);
            let request = with_editor_identity(
                HttpRequest::post(&url, body.clone())
                    .header("Accept", "application/json")
                    .header("Content-Type", "application/json")
                    .header("Authorization", format!("Bearer {}", service.token))
                    .header("X-Request-Id", uuid::Uuid::new_v4().to_string()),
                &self.config,
            );

            let resp = match self.transport.send(request).await {
                Ok(resp) => resp,
                Err(e) => {
                    return Err(CopilotError::ChatUnreachable {
                        url,
                        message: e.to_string(),
                    })
                }
            };

            match resp.status {
                404 => {
                    tracing::debug!(%url, "chat path not supported; trying next");
                    continue;
                }
                200 => return Ok(parse_completion(&resp.body)),
                status => return Err(CopilotError::chat_request(url, status, &resp.body)),
            }
        }

        tracing::warn!(api_base = %service.api_base, "no chat/completions path found");
        Ok(ChatOutcome::NoWorkingPath)
    }
}

fn parse_completion(body: &str) -> ChatOutcome {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ChatOutcome::NonJson(body.to_string());
    };
    let first_choice = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first());
    match first_choice {
        Some(choice) => {
            let content = choice
                .pointer("/message/content")
                .and_then(Value::as_str);
            match content {
                Some(text) => ChatOutcome::Content(text.to_string()),
                None => ChatOutcome::UnknownShape(value),
            }
        }
        None => ChatOutcome::UnknownShape(value),
    }
}

/// Hint for a 400 that complains about the model when none was sent.
pub fn missing_model_hint(error: &CopilotError, settings: &ChatSettings) -> Option<&'static str> {
    match error {
        CopilotError::ChatRequest { status: 400, body, .. }
            if settings.model.is_none() && body.to_lowercase().contains("model") =>
        {
            Some("The endpoint may require a model. Pass --model (or set MODEL), e.g. MODEL=gpt-4o.")
        }
        _ => None,
    }
}
