//! copilot-probe: GitHub Copilot chat access via the OAuth device flow.
//!
//! The flow runs strictly in sequence: request a device code, poll until
//! the user approves, exchange the GitHub token for a Copilot token, then
//! send chat requests (or probe models) against the Copilot API.
//!
//! ```no_run
//! use std::sync::Arc;
//! use copilot_probe::auth::GitHubCopilotAuth;
//! use copilot_probe::chat::{ChatClient, ChatMessage, ChatSettings};
//! use copilot_probe::config::ClientConfig;
//! use copilot_probe::transport::{ReqwestTransport, Transport};
//!
//! # async fn example() -> copilot_probe::error::Result<()> {
//! let config = ClientConfig::resolve()?;
//! let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config)?);
//! let auth = GitHubCopilotAuth::new(transport.clone(), config.clone());
//! let service = auth.authenticate(|a| eprintln!("{}", a.instructions())).await?;
//!
//! let chat = ChatClient::new(transport, config);
//! let outcome = chat
//!     .complete(&service, &[ChatMessage::user("Hello!")], &ChatSettings::default())
//!     .await?;
//! println!("{:?}", outcome.content());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;
