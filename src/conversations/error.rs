use std::time::Duration;

use crate::agent::stateless_llm::LlmError;

/// Failures that end a conversation before it reaches a terminal state
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("{speaker} failed: {source}")]
    Llm {
        speaker: String,
        #[source]
        source: LlmError,
    },

    #[error("{speaker} did not reply within {timeout:?}")]
    TurnTimeout { speaker: String, timeout: Duration },

    #[error("conversation did not finish within {timeout:?}")]
    ConversationTimeout { timeout: Duration },

    #[error("no agents configured")]
    NoAgents,
}
