use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::presenter::PresenterConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Delay between revealed characters.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_timeout_secs: Option<u64>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub video: VideoConfig,
}

const fn default_tick_interval_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            backend_timeout_secs: None,
            log_level: default_log_level(),
            backend: BackendConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn presenter_config(&self) -> PresenterConfig {
        PresenterConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            backend_timeout: self.backend_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Simulated,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen3:4b".to_string()
}

const fn default_timeout() -> u64 {
    600
}

const fn default_simulated_delay_ms() -> u64 {
    1000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            system: None,
            request_timeout: default_timeout(),
            simulated_delay_ms: default_simulated_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoConfig {
    #[serde(default = "default_video_url")]
    pub api_url: String,
    /// Video generation stays disabled until a key is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_video_timeout")]
    pub request_timeout: u64,
}

fn default_video_url() -> String {
    "https://api.did.com/text-to-video".to_string()
}

const fn default_video_timeout() -> u64 {
    120
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            api_url: default_video_url(),
            api_key: None,
            request_timeout: default_video_timeout(),
        }
    }
}
