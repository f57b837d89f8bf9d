use std::time::Duration;

use strum::Display;
use tokio::time::Instant;

use super::AccessToken;

/// Device-code session details returned by the authorization server.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use copilot_probe::auth::DeviceAuthorization;
///
/// let authorization = DeviceAuthorization {
///     device_code: "D1".to_string(),
///     user_code: "ABCD-1234".to_string(),
///     verification_uri: "https://github.com/login/device".to_string(),
///     interval: Duration::from_secs(5),
///     expires_in: Duration::from_secs(900),
/// };
/// assert!(authorization.instructions().contains("ABCD-1234"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Wait between polls; never below one second.
    pub interval: Duration,
    pub expires_in: Duration,
}

impl DeviceAuthorization {
    /// Human-facing login instructions.
    pub fn instructions(&self) -> String {
        format!(
            "Please complete GitHub authentication for Copilot:\n- Visit: {}\n- Enter code: {}",
            self.verification_uri, self.user_code
        )
    }

    /// When the device code lapses if polling began at `started`.
    pub fn expires_at(&self, started: Instant) -> Instant {
        started + self.expires_in.min(MAX_DEVICE_CODE_LIFETIME)
    }
}

/// Outcome of a single poll against the token endpoint.
///
/// Terminal failures (explicit rejection, malformed data) are returned as
/// errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCodePoll {
    Authorized(AccessToken),
    Pending,
    SlowDown,
    /// Non-200 without a readable error code.
    Transient { status: u16 },
}

/// States of the polling loop, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    Pending,
    SlowDown,
    /// Ambiguous non-200; waiting at the current interval.
    Retrying,
    Success,
    Failed,
    TimedOut,
}

/// Longest wait between polls, whatever the server asks for.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Longest device-code lifetime honoured by the poller.
pub const MAX_DEVICE_CODE_LIFETIME: Duration = Duration::from_secs(3600);
