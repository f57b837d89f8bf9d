//! CLI entry point for copilot-probe.

pub mod commands;
pub mod errors;

use clap::{Parser, Subcommand};

pub const DEFAULT_PROMPT: &str = "Say hello from GitHub Copilot.";

/// GitHub Copilot device-flow login and chat probe
#[derive(Parser, Debug)]
#[command(name = "copilot-probe", version, about = "GitHub Copilot chat and model probe")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and send one prompt to Copilot chat
    Chat(ChatArgs),
    /// List Copilot models from the models.dev manifest
    Models(ModelsArgs),
}

/// Arguments for `copilot-probe chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Model id (e.g. gpt-4o); omitted from the request when unset
    #[arg(short, long, env = "MODEL")]
    pub model: Option<String>,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Prompt words (joined with spaces)
    pub prompt: Vec<String>,
}

impl ChatArgs {
    pub fn prompt_text(&self) -> String {
        if self.prompt.is_empty() {
            DEFAULT_PROMPT.to_string()
        } else {
            self.prompt.join(" ")
        }
    }
}

/// Arguments for `copilot-probe models`.
#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Include experimental models from the manifest
    #[arg(long)]
    pub include_experimental: bool,

    /// Authenticate and probe each model with a tiny request
    #[arg(long)]
    pub verify: bool,

    /// Max number of models to probe with --verify
    #[arg(long, default_value_t = 10)]
    pub verify_limit: usize,

    /// Print JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}
