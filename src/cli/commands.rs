//! Handlers for `copilot-probe chat` and `copilot-probe models`.
//!
//! Progress goes to stderr; results go to stdout.

use std::sync::Arc;

use crate::auth::{GitHubCopilotAuth, ServiceToken};
use crate::chat::{missing_model_hint, ChatClient, ChatMessage, ChatOutcome, ChatSettings};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{self, ModelListing, LISTING_DISCLAIMER};
use crate::transport::{ReqwestTransport, Transport};

use super::{ChatArgs, ModelsArgs};

/// Device flow plus token exchange, with the login prompt on stderr.
async fn login(transport: Arc<dyn Transport>, config: &ClientConfig) -> Result<ServiceToken> {
    let auth = GitHubCopilotAuth::new(transport, config.clone());
    let service = auth
        .authenticate(|authorization| {
            eprintln!("{}", authorization.instructions());
            eprintln!("Waiting for authorization...");
        })
        .await?;
    eprintln!("Copilot token acquired. API base: {}", service.api_base);
    Ok(service)
}

/// Handle `copilot-probe chat`.
pub async fn handle_chat(args: ChatArgs, config: ClientConfig) -> Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config)?);
    let service = login(transport.clone(), &config).await?;

    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(args.prompt_text()));

    let settings = ChatSettings {
        model: args.model.clone(),
        max_tokens: args.max_tokens,
        temperature: args.temperature,
    };

    eprintln!("Sending prompt to Copilot...");
    let client = ChatClient::new(transport, config);
    let outcome = match client.complete(&service, &messages, &settings).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(hint) = missing_model_hint(&e, &settings) {
                eprintln!("Hint: {hint}");
            }
            return Err(e);
        }
    };

    match outcome {
        ChatOutcome::Content(reply) => println!("{reply}"),
        ChatOutcome::UnknownShape(value) => {
            eprintln!("Unexpected response; full JSON follows:");
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ChatOutcome::NonJson(body) => {
            eprintln!("Response was not JSON; raw body follows:");
            println!("{body}");
        }
        ChatOutcome::NoWorkingPath => {
            eprintln!("Could not find a working chat/completions path at the Copilot API base.");
        }
    }
    Ok(())
}

/// Handle `copilot-probe models`.
pub async fn handle_models(args: ModelsArgs, config: ClientConfig) -> Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config)?);
    let manifest = models::fetch_manifest(transport.as_ref(), &config).await?;
    let mut listed = models::list_models(
        &manifest,
        &config.manifest_provider,
        args.include_experimental,
    );

    if args.verify && !listed.is_empty() {
        eprintln!("Starting verification flow...");
        let service = login(transport.clone(), &config).await?;
        let client = ChatClient::new(transport, config.clone());
        models::verify_models(&client, &service, &mut listed, args.verify_limit).await;
    }

    let listing = ModelListing::new(config.manifest_provider.clone(), listed);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", render_listing(&listing));
    }
    Ok(())
}

/// Human-readable listing.
pub fn render_listing(listing: &ModelListing) -> String {
    let mut out = format!("{LISTING_DISCLAIMER}\n");
    if listing.models.is_empty() {
        out.push_str(&format!("No models found for provider: {}\n", listing.provider));
        return out;
    }
    out.push_str(&format!("Provider: {}\n", listing.provider));
    out.push_str(&format!("Models ({}):\n", listing.count));
    for model in &listing.models {
        let flag = if model.experimental {
            " [experimental]"
        } else {
            ""
        };
        let verified = match (&model.verified, &model.verify_detail) {
            (Some(ok), detail) => format!(
                " [verified={ok}, {}]",
                detail.as_deref().unwrap_or_default()
            ),
            (None, _) => String::new(),
        };
        out.push_str(&format!("- {} ({}){flag}{verified}\n", model.name, model.id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ManifestModel;

    fn model(id: &str, experimental: bool) -> ManifestModel {
        ManifestModel {
            id: id.to_string(),
            name: id.to_uppercase(),
            experimental,
            verified: None,
            verify_detail: None,
        }
    }

    #[test]
    fn render_listing_marks_experimental_and_verified() {
        let mut verified = model("gpt-4o", false);
        verified.verified = Some(false);
        verified.verify_detail = Some("403 forbidden".into());
        let listing = ModelListing::new("github-copilot", vec![verified, model("o3", true)]);
        let text = render_listing(&listing);
        assert!(text.contains("Models (2):"));
        assert!(text.contains("- GPT-4O (gpt-4o) [verified=false, 403 forbidden]"));
        assert!(text.contains("- O3 (o3) [experimental]\n"));
    }

    #[test]
    fn render_listing_reports_empty_provider() {
        let text = render_listing(&ModelListing::new("github-copilot", Vec::new()));
        assert!(text.ends_with("No models found for provider: github-copilot\n"));
    }
}
