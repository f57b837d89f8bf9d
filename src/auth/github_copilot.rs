use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::{truncate_body, CopilotError, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};

use super::device_code::{
    DeviceAuthorization, DeviceCodePoll, PollState, MAX_DEVICE_CODE_LIFETIME, MAX_POLL_INTERVAL,
};
use super::token::{parse_expires_at, AccessToken, ServiceToken};
use super::{with_editor_identity, with_json_headers};

const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// GitHub device-code login and Copilot token exchange.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use copilot_probe::auth::GitHubCopilotAuth;
/// use copilot_probe::config::ClientConfig;
/// use copilot_probe::transport::ReqwestTransport;
///
/// # async fn run() -> copilot_probe::error::Result<()> {
/// let config = ClientConfig::default();
/// let transport = Arc::new(ReqwestTransport::new(&config)?);
/// let auth = GitHubCopilotAuth::new(transport, config);
/// let service = auth
///     .authenticate(|authorization| eprintln!("{}", authorization.instructions()))
///     .await?;
/// println!("{}", service.api_base);
/// # Ok(())
/// # }
/// ```
pub struct GitHubCopilotAuth {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl GitHubCopilotAuth {
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run the whole flow: device code, user prompt, polling, exchange.
    pub async fn authenticate<F>(&self, on_prompt: F) -> Result<ServiceToken>
    where
        F: FnOnce(&DeviceAuthorization),
    {
        let authorization = self.start_device_code().await?;
        on_prompt(&authorization);
        let access_token = self.wait_for_access_token(&authorization).await?;
        self.exchange_copilot_token(access_token).await
    }

    /// Request a device code and user code.
    pub async fn start_device_code(&self) -> Result<DeviceAuthorization> {
        let request = with_json_headers(
            HttpRequest::post(
                &self.config.device_code_url,
                json!({
                    "client_id": self.config.client_id,
                    "scope": self.config.scope,
                }),
            ),
            &self.config,
        );
        let resp = self.transport.send(request).await?;
        if !resp.is_success() {
            return Err(CopilotError::AuthServer {
                status: Some(resp.status),
                message: truncate_body(&resp.body),
            });
        }
        let payload: DeviceCodeResponse = resp.json().map_err(|e| CopilotError::AuthServer {
            status: Some(resp.status),
            message: format!("invalid JSON body: {e}"),
        })?;

        let interval = match payload.interval {
            Some(secs) => Duration::from_secs(secs.clamp(1, MAX_POLL_INTERVAL.as_secs())),
            None => self.config.default_poll_interval,
        };
        let expires_in = payload.expires_in.ok_or_else(|| missing("expires_in"))?;
        let authorization = DeviceAuthorization {
            device_code: non_empty(payload.device_code).ok_or_else(|| missing("device_code"))?,
            user_code: non_empty(payload.user_code).ok_or_else(|| missing("user_code"))?,
            verification_uri: non_empty(payload.verification_uri)
                .ok_or_else(|| missing("verification_uri"))?,
            interval,
            expires_in: Duration::from_secs(expires_in).min(MAX_DEVICE_CODE_LIFETIME),
        };
        tracing::info!(
            interval_secs = authorization.interval.as_secs(),
            expires_in_secs = authorization.expires_in.as_secs(),
            "device code issued"
        );
        Ok(authorization)
    }

    /// Issue one token request and classify the answer.
    pub async fn poll_device_code(
        &self,
        authorization: &DeviceAuthorization,
    ) -> Result<DeviceCodePoll> {
        let request = with_json_headers(
            HttpRequest::post(
                &self.config.access_token_url,
                json!({
                    "client_id": self.config.client_id,
                    "device_code": authorization.device_code,
                    "grant_type": DEVICE_CODE_GRANT_TYPE,
                }),
            ),
            &self.config,
        );
        let resp = self.transport.send(request).await?;
        classify_poll_response(&resp)
    }

    /// Poll until the user approves, the server rejects the flow, or the
    /// device code expires.
    pub async fn wait_for_access_token(
        &self,
        authorization: &DeviceAuthorization,
    ) -> Result<AccessToken> {
        let deadline = authorization.expires_at(Instant::now());
        let mut interval = authorization.interval.min(MAX_POLL_INTERVAL);
        let mut attempts: u32 = 0;

        while Instant::now() < deadline {
            attempts += 1;
            let poll = match self.poll_device_code(authorization).await {
                Ok(poll) => poll,
                Err(e) => {
                    let state = PollState::Failed;
                    tracing::debug!(%state, attempts, error = %e, "device flow stopped");
                    return Err(e);
                }
            };
            let state = match poll {
                DeviceCodePoll::Authorized(token) => {
                    let state = PollState::Success;
                    tracing::info!(%state, attempts, "device flow authorized");
                    return Ok(token);
                }
                DeviceCodePoll::Pending => PollState::Pending,
                DeviceCodePoll::SlowDown => {
                    interval = interval
                        .saturating_add(self.config.slow_down_increment)
                        .min(MAX_POLL_INTERVAL);
                    PollState::SlowDown
                }
                DeviceCodePoll::Transient { status } => {
                    tracing::warn!(status, attempts, "token poll returned non-200; retrying");
                    PollState::Retrying
                }
            };
            tracing::debug!(%state, interval_secs = interval.as_secs(), "waiting before next poll");
            tokio::time::sleep(interval).await;
        }

        let state = PollState::TimedOut;
        tracing::debug!(%state, attempts, "device flow deadline reached");
        Err(CopilotError::DeviceFlowTimeout {
            expires_in_secs: authorization.expires_in.as_secs(),
        })
    }

    /// Trade the GitHub access token for a Copilot API token.
    pub async fn exchange_copilot_token(&self, access_token: AccessToken) -> Result<ServiceToken> {
        let request = with_editor_identity(
            HttpRequest::get(&self.config.copilot_token_url)
                .header("Accept", "application/json")
                .header("Authorization", format!("Bearer {}", access_token.secret())),
            &self.config,
        );

        let resp = self.transport.send(request).await?;
        if resp.status != 200 {
            return Err(CopilotError::token_exchange(resp.status, &resp.body));
        }
        let payload: CopilotTokenResponse = serde_json::from_str(&resp.body)
            .map_err(|_| CopilotError::token_exchange(resp.status, &resp.body))?;

        let token = non_empty(payload.token);
        let api_base = payload.endpoints.and_then(|endpoints| non_empty(endpoints.api));
        let (Some(token), Some(api_base)) = (token, api_base) else {
            return Err(CopilotError::TokenExchange {
                status: resp.status,
                body: format!(
                    "response missing token or endpoints.api: {}",
                    truncate_body(&resp.body)
                ),
            });
        };

        let service = ServiceToken {
            token,
            api_base,
            expires_at: parse_expires_at(&payload.expires_at),
            refresh_in: payload.refresh_in,
        };
        tracing::info!(api_base = %service.api_base, "copilot token acquired");
        Ok(service)
    }
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: Option<String>,
    user_code: Option<String>,
    verification_uri: Option<String>,
    #[serde(default, deserialize_with = "lenient_secs")]
    expires_in: Option<u64>,
    #[serde(default, deserialize_with = "lenient_secs")]
    interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DeviceTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CopilotTokenResponse {
    token: Option<String>,
    #[serde(default)]
    expires_at: Value,
    #[serde(default, deserialize_with = "lenient_secs")]
    refresh_in: Option<u64>,
    endpoints: Option<CopilotEndpoints>,
}

#[derive(Debug, Deserialize)]
struct CopilotEndpoints {
    api: Option<String>,
}

/// Whole seconds, sent either as a number or as a numeric string.
fn lenient_secs<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    }))
}

fn classify_poll_response(resp: &HttpResponse) -> Result<DeviceCodePoll> {
    let parsed = serde_json::from_str::<DeviceTokenResponse>(&resp.body).ok();
    let error_code = parsed.as_ref().and_then(|p| p.error.as_deref());

    if resp.status != 200 {
        return match error_code {
            Some(code) => interpret_error_code(code, &resp.body),
            None => Ok(DeviceCodePoll::Transient {
                status: resp.status,
            }),
        };
    }

    let Some(payload) = parsed.as_ref() else {
        return Err(CopilotError::DeviceFlow {
            payload: resp.body.clone(),
        });
    };
    if let Some(token) = payload.access_token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(DeviceCodePoll::Authorized(AccessToken::new(token)));
    }
    match error_code {
        Some(code) => interpret_error_code(code, &resp.body),
        None => Err(CopilotError::DeviceFlow {
            payload: resp.body.clone(),
        }),
    }
}

fn interpret_error_code(code: &str, body: &str) -> Result<DeviceCodePoll> {
    match code {
        "authorization_pending" => Ok(DeviceCodePoll::Pending),
        "slow_down" => Ok(DeviceCodePoll::SlowDown),
        _ => Err(CopilotError::DeviceFlow {
            payload: body.to_string(),
        }),
    }
}

fn missing(field: &str) -> CopilotError {
    CopilotError::AuthServer {
        status: None,
        message: format!("response missing required field `{field}`"),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
