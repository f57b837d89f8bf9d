//! Shared scripted transport for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use copilot_probe::auth::DeviceAuthorization;
use copilot_probe::error::{CopilotError, Result};
use copilot_probe::transport::{HttpRequest, HttpResponse, Transport};
use serde_json::Value;
use tokio::time::Instant;

/// A request as seen by the transport, stamped with the (possibly paused) clock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: HttpRequest,
    pub at: Instant,
}

/// Replays canned responses in order, then the fallback (if any).
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse>>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, status: u16, body: Value) -> Self {
        self.raw(status, &body.to_string())
    }

    pub fn raw(self, status: u16, body: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn network_error(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(CopilotError::Network(message.to_string())));
        self
    }

    /// Answer every request beyond the script with this response.
    pub fn forever(mut self, status: u16, body: Value) -> Self {
        self.fallback = Some(HttpResponse::new(status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Gaps between consecutive requests.
    pub fn gaps(&self) -> Vec<Duration> {
        let requests = self.requests();
        requests.windows(2).map(|w| w[1].at - w[0].at).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            request,
            at: Instant::now(),
        });
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| CopilotError::Network("script exhausted".to_string())),
        }
    }
}

pub fn authorization(interval_secs: u64, expires_in_secs: u64) -> DeviceAuthorization {
    DeviceAuthorization {
        device_code: "D1".to_string(),
        user_code: "ABCD-1234".to_string(),
        verification_uri: "https://github.com/login/device".to_string(),
        interval: Duration::from_secs(interval_secs),
        expires_in: Duration::from_secs(expires_in_secs),
    }
}
