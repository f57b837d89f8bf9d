//! End-to-end tests over real HTTP against wiremock servers.

use std::sync::Arc;
use std::time::Duration;

use copilot_probe::auth::GitHubCopilotAuth;
use copilot_probe::chat::{ChatClient, ChatMessage, ChatOutcome, ChatSettings};
use copilot_probe::config::ClientConfig;
use copilot_probe::error::CopilotError;
use copilot_probe::models::{fetch_manifest, list_models};
use copilot_probe::transport::{ReqwestTransport, Transport};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_auth_base_url(&server.uri())
        .with_manifest_url(format!("{}/api.json", server.uri()))
        .with_request_timeout(Duration::from_secs(5))
}

fn transport(config: &ClientConfig) -> Arc<dyn Transport> {
    Arc::new(ReqwestTransport::new(config).expect("client"))
}

#[tokio::test]
async fn login_then_chat_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", "GitHubCopilotChat/0.26.7"))
        .and(body_partial_json(json!({"scope": "read:user"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "D1",
            "user_code": "ABCD-1234",
            "verification_uri": "https://github.com/login/device",
            "interval": 1,
            "expires_in": 5
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_partial_json(json!({"device_code": "D1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "authorization_pending"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/copilot_internal/v2/token"))
        .and(header("authorization", "Bearer T1"))
        .and(header("editor-version", "vscode/1.99.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "cop_token",
            "expires_at": 1_900_000_000,
            "endpoints": {"api": server.uri()}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer cop_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello from Copilot"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let transport = transport(&config);
    let auth = GitHubCopilotAuth::new(transport.clone(), config.clone());

    let started = std::time::Instant::now();
    let service = auth.authenticate(|_| {}).await.expect("login");
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(service.api_base, server.uri());

    let chat = ChatClient::new(transport, config);
    let outcome = chat
        .complete(&service, &[ChatMessage::user("hi")], &ChatSettings::default())
        .await
        .expect("chat");
    assert_eq!(outcome, ChatOutcome::Content("Hello from Copilot".to_string()));
}

#[tokio::test]
async fn device_code_server_error_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let auth = GitHubCopilotAuth::new(transport(&config), config);
    let err = auth.start_device_code().await.unwrap_err();
    assert!(
        matches!(&err, CopilotError::AuthServer { status: Some(500), message } if message == "boom"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn chat_forbidden_over_http_skips_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(403).set_body_string("model not enabled"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let chat = ChatClient::new(transport(&config), config);
    let service = copilot_probe::auth::ServiceToken::new("cop", server.uri());
    let err = chat
        .complete(&service, &[ChatMessage::user("hi")], &ChatSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn unreachable_host_is_chat_unreachable() {
    let config = ClientConfig::default().with_request_timeout(Duration::from_secs(2));
    let chat = ChatClient::new(transport(&config), config);
    let service = copilot_probe::auth::ServiceToken::new("cop", "http://127.0.0.1:9");
    let err = chat
        .complete(&service, &[ChatMessage::user("hi")], &ChatSettings::default())
        .await
        .unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
}

#[tokio::test]
async fn manifest_fetch_and_listing_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.json"))
        .and(header("user-agent", "opencode-models-sample/0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "github-copilot": {"models": {
                "gpt-4o": {"name": "GPT-4o"},
                "gpt-5-preview": {"name": "GPT-5 Preview", "experimental": true}
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let manifest = fetch_manifest(transport(&config).as_ref(), &config)
        .await
        .expect("manifest");
    let models = list_models(&manifest, &config.manifest_provider, false);
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].id, "gpt-4o");
}

#[tokio::test]
async fn manifest_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = fetch_manifest(transport(&config).as_ref(), &config)
        .await
        .unwrap_err();
    assert!(matches!(&err, CopilotError::Manifest(msg) if msg.contains("503")));
}
