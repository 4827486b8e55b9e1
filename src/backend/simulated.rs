// Offline backend that answers after a fixed delay

use async_trait::async_trait;
use std::time::Duration;

use super::{BackendError, PromptBackend};

pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn response_for(prompt: &str) -> String {
        format!("This is a simulated response for the prompt: {prompt}")
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_DELAY)
    }
}

#[async_trait]
impl PromptBackend for SimulatedBackend {
    async fn call(&self, prompt: &str) -> Result<String, BackendError> {
        tokio::time::sleep(self.delay).await;
        Ok(Self::response_for(prompt))
    }
}
