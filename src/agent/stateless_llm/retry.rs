use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::stateless_llm_interface::{ChatMessage, LlmError, StatelessLLMInterface, TokenStream};
use crate::config_manager::agent::RetryConfig;

/// Retries transient failures of the wrapped LLM with exponential backoff.
///
/// Only starting a completion is retried; once tokens are flowing, a broken
/// stream surfaces to the caller unchanged.
pub struct RetryingLLM {
    inner: Arc<dyn StatelessLLMInterface>,
    config: RetryConfig,
}

impl RetryingLLM {
    pub fn new(inner: Arc<dyn StatelessLLMInterface>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    fn compute_delay(&self, attempt: u32) -> Duration {
        let base = self.config.initial_delay_ms as f64
            * self.config.backoff_multiplier.powi(attempt as i32);
        let capped = base.min(self.config.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }
}

#[async_trait]
impl StatelessLLMInterface for RetryingLLM {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        system: Option<&str>,
    ) -> Result<TokenStream, LlmError> {
        let mut attempt = 0;
        loop {
            match self.inner.chat_completion(messages.clone(), system).await {
                Ok(tokens) => return Ok(tokens),
                Err(e) if attempt < self.config.max_retries && e.is_transient() => {
                    let delay = self.compute_delay(attempt);
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying LLM request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
