use std::sync::Arc;

use crate::agent::agents::AgentRoster;
use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::agent::{AgentFactory, StatelessLLMFactory};
use crate::config_manager::Config;

/// Shared, read-only handles every request works from
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub roster: Arc<AgentRoster>,
    pub llm: Arc<dyn StatelessLLMInterface>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let agent_config = &config.agent_config;
        let llm = StatelessLLMFactory::create_llm(
            &agent_config.llm_provider,
            config.llm_settings()?,
            &agent_config.retry,
        )?;
        Self::with_llm(config, llm)
    }

    pub fn with_llm(config: Config, llm: Arc<dyn StatelessLLMInterface>) -> anyhow::Result<Self> {
        let roster = AgentFactory::create_roster(&config.agent_config)?;
        Ok(Self {
            config: Arc::new(config),
            roster: Arc::new(roster),
            llm,
        })
    }
}
