use serde::Serialize;

use crate::auth::ServiceToken;
use crate::error::CopilotError;

use super::{ChatClient, ChatMessage, ChatOutcome, ChatSettings};

pub const PROBE_PROMPT: &str = "Respond with the single word: ok";
const PROBE_MAX_TOKENS: u32 = 5;

/// Usability verdict for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub ok: bool,
    pub detail: String,
}

impl ProbeResult {
    fn new(ok: bool, detail: impl Into<String>) -> Self {
        Self {
            ok,
            detail: detail.into(),
        }
    }
}

impl ChatClient {
    /// Send a tiny zero-temperature prompt to `model_id` and report whether
    /// the account can use it. Never fails; problems land in `detail`.
    pub async fn probe_model(&self, service: &ServiceToken, model_id: &str) -> ProbeResult {
        let settings = ChatSettings::builder()
            .model(model_id)
            .max_tokens(PROBE_MAX_TOKENS)
            .temperature(0.0)
            .build();
        let messages = [ChatMessage::user(PROBE_PROMPT)];

        let result = match self.complete(service, &messages, &settings).await {
            Ok(outcome) => verdict_for(&outcome),
            Err(error) => verdict_for_error(&error),
        };
        tracing::debug!(model = model_id, ok = result.ok, detail = %result.detail, "model probed");
        result
    }
}

fn verdict_for(outcome: &ChatOutcome) -> ProbeResult {
    match outcome {
        ChatOutcome::Content(_) => ProbeResult::new(true, "200 ok"),
        ChatOutcome::UnknownShape(_) => ProbeResult::new(false, "200 unknown-shape"),
        ChatOutcome::NonJson(_) => ProbeResult::new(true, "200 OK (non-JSON?)"),
        ChatOutcome::NoWorkingPath => ProbeResult::new(false, "no-known-chat-path"),
    }
}

fn verdict_for_error(error: &CopilotError) -> ProbeResult {
    match error {
        CopilotError::ChatRequest { status, body, .. } => {
            ProbeResult::new(false, format!("{status} {body}"))
        }
        CopilotError::ChatUnreachable { message, .. } => {
            ProbeResult::new(false, format!("request-error: {message}"))
        }
        other => ProbeResult::new(false, format!("request-error: {other}")),
    }
}
