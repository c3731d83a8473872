pub mod agent_factory;
pub mod stateless_llm_factory;
pub mod input_types;
pub mod output_types;

pub mod agents;
pub mod stateless_llm;

pub use agent_factory::AgentFactory;
pub use stateless_llm_factory::StatelessLLMFactory;
