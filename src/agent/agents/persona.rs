use tracing::debug;

use crate::agent::stateless_llm::{collect_completion, ChatMessage, LlmError, StatelessLLMInterface};
use crate::conversations::types::{Speaker, Transcript};

/// Rule that ends the exchange once a persona's output satisfies it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationPredicate {
    Never,
    /// Case-insensitive substring match
    ContainsMarker(String),
}

impl TerminationPredicate {
    pub fn is_satisfied_by(&self, text: &str) -> bool {
        match self {
            TerminationPredicate::Never => false,
            TerminationPredicate::ContainsMarker(marker) => {
                text.to_uppercase().contains(&marker.to_uppercase())
            }
        }
    }
}

/// A named role with fixed instructions, sent as the system prompt on every turn.
/// Personas hold no conversation state; the transcript is passed in per turn.
#[derive(Debug, Clone)]
pub struct AgentPersona {
    name: String,
    description: String,
    instructions: String,
    termination: TerminationPredicate,
}

impl AgentPersona {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        instructions: impl Into<String>,
        termination: TerminationPredicate,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            instructions: instructions.into(),
            termination,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    #[cfg(test)]
    pub fn termination(&self) -> &TerminationPredicate {
        &self.termination
    }

    pub fn is_termination_msg(&self, text: &str) -> bool {
        self.termination.is_satisfied_by(text)
    }

    /// Render the transcript from this persona's point of view: its own turns
    /// are `assistant` messages, everything else is a `user` message tagged
    /// with the speaker.
    pub fn to_messages(&self, transcript: &Transcript) -> Vec<ChatMessage> {
        transcript
            .entries()
            .iter()
            .map(|entry| match &entry.speaker {
                Speaker::Agent(name) if *name == self.name => ChatMessage::assistant(entry.content.clone()),
                Speaker::Agent(name) => ChatMessage::user(format!("[{}]\n{}", name, entry.content)),
                Speaker::User => ChatMessage::user(entry.content.clone()),
            })
            .collect()
    }

    /// Ask the LLM for this persona's next turn
    pub async fn generate_reply(
        &self,
        llm: &dyn StatelessLLMInterface,
        transcript: &Transcript,
    ) -> Result<String, LlmError> {
        let messages = self.to_messages(transcript);
        debug!("{}: requesting reply over {} messages", self.name, messages.len());
        let tokens = llm.chat_completion(messages, Some(self.instructions.as_str())).await?;
        let reply = collect_completion(tokens).await?;
        Ok(reply.trim().to_string())
    }
}
