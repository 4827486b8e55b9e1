// HTTP prompt backend (Ollama-compatible generate endpoint)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{BackendError, PromptBackend};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    model: String,
    system: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        request_timeout: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            system: None,
            client,
        })
    }

    #[must_use]
    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send generate request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed with status {status}: {text}");
        }

        let result = response
            .json::<GenerateResponse>()
            .await
            .context("Failed to parse generate response")?;

        Ok(result)
    }

    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        Ok(self
            .client
            .get(&url)
            .send()
            .await
            .is_ok_and(|response| response.status().is_success()))
    }
}

#[async_trait]
impl PromptBackend for HttpBackend {
    async fn call(&self, prompt: &str) -> Result<String, BackendError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: self.system.clone(),
            stream: false,
        };

        tracing::debug!(model = %self.model, "sending generate request");
        let response = self.generate(&request).await?;
        if !response.done {
            tracing::warn!(model = %self.model, "generate response not marked done");
        }

        Ok(response.response)
    }

    async fn is_available(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_backend_creation_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:11434/", "qwen3:4b", 30).unwrap();
        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(backend.model, "qwen3:4b");
    }

    #[test]
    fn test_generate_request_serialization_skips_empty_system() {
        let request = GenerateRequest {
            model: "test".to_string(),
            prompt: "Hello".to_string(),
            system: None,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({"model": "test", "prompt": "Hello", "stream": false})
        );
    }

    #[tokio::test]
    async fn test_call_returns_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "qwen3:4b",
                "prompt": "hello",
                "system": "Be kind.",
                "stream": false
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": "Hi!", "done": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri(), "qwen3:4b", 5)
            .unwrap()
            .with_system(Some("Be kind.".to_string()));

        assert_eq!(backend.call("hello").await.unwrap(), "Hi!");
    }

    #[tokio::test]
    async fn test_call_maps_server_error_to_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri(), "qwen3:4b", 5).unwrap();
        let err = backend.call("hello").await.unwrap_err();

        assert!(err.message().contains("503"), "unexpected error: {err}");
        assert!(err.message().contains("model loading"));
    }

    #[tokio::test]
    async fn test_call_reports_unparseable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri(), "qwen3:4b", 5).unwrap();
        let err = backend.call("hello").await.unwrap_err();

        assert!(err.message().starts_with("Failed to parse generate response"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri(), "qwen3:4b", 5).unwrap();
        assert!(backend.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_unreachable_server() {
        let backend = HttpBackend::new("http://127.0.0.1:9", "qwen3:4b", 1).unwrap();
        assert!(!backend.health_check().await.unwrap());
        assert!(!backend.is_available().await);
    }
}
