//! CLI-specific error formatting for user-facing messages.

use crate::error::CopilotError;

/// Map a [`CopilotError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &CopilotError) -> String {
    match err {
        CopilotError::DeviceFlowTimeout { .. } => {
            format!("{err}. Run the command again to get a fresh code.")
        }
        CopilotError::DeviceFlow { .. } => {
            format!("{err}. The login was rejected; run the command again to restart it.")
        }
        CopilotError::TokenExchange { status: 401 | 403, .. } => {
            format!("{err}. Check that this GitHub account has an active Copilot subscription.")
        }
        CopilotError::Configuration(_) => {
            format!("{err}. Check COPILOT_PROBE_* variables and the config file.")
        }
        other => format!("{other}"),
    }
}
