use serde::Serialize;
use serde_json::Value;

use crate::auth::ServiceToken;
use crate::chat::ChatClient;
use crate::config::ClientConfig;
use crate::error::{truncate_body, CopilotError, Result};
use crate::transport::{HttpRequest, Transport};

use super::LISTING_DISCLAIMER;

/// One model entry for a provider in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestModel {
    pub id: String,
    pub name: String,
    pub experimental: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_detail: Option<String>,
}

/// Report printed by `copilot-probe models --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelListing {
    pub provider: String,
    pub disclaimer: &'static str,
    pub count: usize,
    pub models: Vec<ManifestModel>,
}

impl ModelListing {
    pub fn new(provider: impl Into<String>, models: Vec<ManifestModel>) -> Self {
        Self {
            provider: provider.into(),
            disclaimer: LISTING_DISCLAIMER,
            count: models.len(),
            models,
        }
    }
}

/// Download the manifest document.
pub async fn fetch_manifest(transport: &dyn Transport, config: &ClientConfig) -> Result<Value> {
    let request = HttpRequest::get(&config.manifest_url)
        .header("Accept", "application/json")
        .header("User-Agent", &config.manifest_user_agent);
    let resp = transport.send(request).await?;
    if !resp.is_success() {
        return Err(CopilotError::Manifest(format!(
            "{} returned {}: {}",
            config.manifest_url,
            resp.status,
            truncate_body(&resp.body)
        )));
    }
    resp.json()
        .map_err(|e| CopilotError::Manifest(format!("invalid manifest JSON: {e}")))
}

/// Models listed under `provider`, sorted by display name then id.
///
/// Experimental models are skipped unless `include_experimental` is set.
pub fn list_models(manifest: &Value, provider: &str, include_experimental: bool) -> Vec<ManifestModel> {
    let Some(models) = manifest
        .get(provider)
        .and_then(|p| p.get("models"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let mut out: Vec<ManifestModel> = models
        .iter()
        .filter_map(|(id, info)| {
            let experimental = info
                .get("experimental")
                .map(is_truthy)
                .unwrap_or(false);
            if experimental && !include_experimental {
                return None;
            }
            let name = info
                .get("name")
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
                .unwrap_or(id.as_str())
                .to_string();
            Some(ManifestModel {
                id: id.clone(),
                name,
                experimental,
                verified: None,
                verify_detail: None,
            })
        })
        .collect();
    out.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
    out
}

/// Probe the first `limit` models and record the verdicts in place.
pub async fn verify_models(
    client: &ChatClient,
    service: &ServiceToken,
    models: &mut [ManifestModel],
    limit: usize,
) {
    for model in models.iter_mut().take(limit) {
        let result = client.probe_model(service, &model.id).await;
        model.verified = Some(result.ok);
        model.verify_detail = Some(result.detail);
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
