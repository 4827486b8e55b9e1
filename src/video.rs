// Text-to-video API client

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::VideoConfig;

#[derive(Debug, Clone)]
pub struct TextToVideoClient {
    api_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
pub struct VideoRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct VideoResponse {
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl VideoResponse {
    pub fn video_url(&self) -> Option<&str> {
        self.result_url.as_deref().or(self.url.as_deref())
    }
}

impl TextToVideoClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &VideoConfig) -> Result<Option<Self>> {
        match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(Some(Self::new(
                config.api_url.clone(),
                key,
                config.request_timeout,
            )?)),
            _ => Ok(None),
        }
    }

    /// Ask the service to render `text` and return the video URL.
    pub async fn create_video(&self, text: &str) -> Result<String> {
        tracing::debug!(chars = text.chars().count(), "requesting video");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&VideoRequest { text })
            .send()
            .await
            .context("Failed to send text-to-video request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Video request failed with status {status}: {text}");
        }

        let body = response
            .json::<VideoResponse>()
            .await
            .context("Failed to parse text-to-video response")?;

        body.video_url()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Text-to-video response did not contain a video URL"))
    }
}
