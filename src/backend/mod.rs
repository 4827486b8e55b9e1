// Prompt backends: turn a prompt into a full response or an error

pub mod http;
pub mod simulated;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BackendConfig, BackendKind};

pub use http::HttpBackend;
pub use simulated::SimulatedBackend;

/// The only failure a backend reports. The presenter shows the description
/// as-is and never inspects it further.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for BackendError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

/// Resolves exactly once per call, or never.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    async fn call(&self, prompt: &str) -> Result<String, BackendError>;

    /// Cheap reachability check run once at startup.
    async fn is_available(&self) -> bool {
        true
    }
}

/// Build the backend selected in the configuration file.
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn PromptBackend>> {
    let backend: Arc<dyn PromptBackend> = match config.kind {
        BackendKind::Simulated => Arc::new(SimulatedBackend::new(Duration::from_millis(
            config.simulated_delay_ms,
        ))),
        BackendKind::Http => Arc::new(
            HttpBackend::new(
                config.base_url.clone(),
                config.model.clone(),
                config.request_timeout,
            )?
            .with_system(config.system.clone()),
        ),
    };

    tracing::info!(kind = ?config.kind, "prompt backend ready");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display_is_verbatim() {
        let err = BackendError::new("network down");
        assert_eq!(err.to_string(), "network down");
        assert_eq!(err.message(), "network down");
    }

    #[test]
    fn test_backend_error_from_anyhow_keeps_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("Failed to send generate request");
        let err = BackendError::from(err);
        assert_eq!(
            err.message(),
            "Failed to send generate request: connection refused"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_simulated_backend() {
        let config = BackendConfig {
            kind: BackendKind::Simulated,
            simulated_delay_ms: 10,
            ..Default::default()
        };
        let backend = build_backend(&config).unwrap();
        let response = backend.call("how do I say no?").await.unwrap();
        assert!(response.ends_with("how do I say no?"));
    }

    #[test]
    fn test_build_http_backend() {
        let config = BackendConfig {
            kind: BackendKind::Http,
            ..Default::default()
        };
        assert!(build_backend(&config).is_ok());
    }
}
