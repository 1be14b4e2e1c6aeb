//! Mock Gemini server

use serde_json::json;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Gemini `generateContent` endpoint
///
/// Matches any model name, so tests can use `GeminiConfig::with_url(server.url())`
/// with the default model.
pub struct MockGeminiServer {
    server: MockServer,
}

impl MockGeminiServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mock
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Underlying server, for request inspection
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Generation succeeds with a single candidate containing `text`
    pub async fn mock_generate_success(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/[^/]+:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Generation fails with the given status and message
    pub async fn mock_generate_failure(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/[^/]+:generateContent$"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": status, "message": message}
            })))
            .mount(&self.server)
            .await;
    }

    /// Model metadata lookup succeeds (used by health checks)
    pub async fn mock_model_info(&self) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1beta/models/[^/:]+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "models/gemini-1.5-flash"
            })))
            .mount(&self.server)
            .await;
    }
}
