use std::sync::Arc;
use tracing::info;
use anyhow::Result;

use crate::agent::stateless_llm::{OpenAICompatibleLLM, RetryingLLM, StatelessLLMInterface};
use crate::config_manager::agent::RetryConfig;
use crate::config_manager::stateless_llm::OpenAICompatibleConfig;

/// Factory for creating stateless LLM instances
pub struct StatelessLLMFactory;

impl StatelessLLMFactory {
    /// Create an LLM based on the configuration.
    ///
    /// # Arguments
    /// * `llm_provider` - The type of LLM to create
    /// * `config` - Settings of that provider
    /// * `retry` - Backoff settings; zero retries leaves the client unwrapped
    pub fn create_llm(
        llm_provider: &str,
        config: &OpenAICompatibleConfig,
        retry: &RetryConfig,
    ) -> Result<Arc<dyn StatelessLLMInterface>> {
        info!("Initializing LLM: {}", llm_provider);

        let llm: Arc<dyn StatelessLLMInterface> = match llm_provider {
            "openai_compatible_llm" | "openai_llm" | "groq_llm" | "ollama_llm" => {
                Arc::new(OpenAICompatibleLLM::new(config)?)
            }
            _ => return Err(anyhow::anyhow!("Unsupported LLM provider: {}", llm_provider)),
        };

        if retry.max_retries == 0 {
            return Ok(llm);
        }
        Ok(Arc::new(RetryingLLM::new(llm, retry.clone())))
    }
}
