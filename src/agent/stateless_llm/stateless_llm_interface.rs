use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

/// Stream of completion tokens, in arrival order
pub type TokenStream = BoxStream<'static, Result<String, LlmError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request to LLM provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM provider reported an error: {0}")]
    Provider(String),

    #[error("malformed stream chunk: {0}")]
    MalformedChunk(String),

    #[error("LLM returned an empty completion")]
    EmptyCompletion,
}

impl LlmError {
    /// Rate limits, server errors and dropped connections are worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport(e) => e.is_timeout() || e.is_connect(),
            LlmError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Interface for a stateless language model
/// Stateless means the LLM doesn't store memory, system prompts, or user messages
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Start a chat completion and return the response tokens as they arrive
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        system: Option<&str>,
    ) -> Result<TokenStream, LlmError>;

    fn model_name(&self) -> &str;
}

/// Drain a token stream into the complete response text
pub async fn collect_completion(mut tokens: TokenStream) -> Result<String, LlmError> {
    let mut complete_response = String::new();
    while let Some(token) = tokens.next().await {
        complete_response.push_str(&token?);
    }
    if complete_response.trim().is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    Ok(complete_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_tokens_in_order() {
        let tokens: TokenStream = futures::stream::iter(vec![
            Ok("FINAL ".to_string()),
            Ok("ANSWER: ".to_string()),
            Ok("yes".to_string()),
        ])
        .boxed();
        assert_eq!(collect_completion(tokens).await.unwrap(), "FINAL ANSWER: yes");
    }

    #[tokio::test]
    async fn whitespace_only_completion_is_empty() {
        let tokens: TokenStream = futures::stream::iter(vec![Ok("  \n".to_string())]).boxed();
        assert!(matches!(
            collect_completion(tokens).await,
            Err(LlmError::EmptyCompletion)
        ));
    }

    #[tokio::test]
    async fn stream_error_stops_collection() {
        let tokens: TokenStream = futures::stream::iter(vec![
            Ok("partial".to_string()),
            Err(LlmError::MalformedChunk("{".to_string())),
        ])
        .boxed();
        assert!(matches!(
            collect_completion(tokens).await,
            Err(LlmError::MalformedChunk(_))
        ));
    }

    #[test]
    fn transient_statuses() {
        let status = |status| LlmError::Status { status, body: String::new() };
        assert!(status(429).is_transient());
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(401).is_transient());
        assert!(!status(400).is_transient());
        assert!(!LlmError::EmptyCompletion.is_transient());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::System.as_str(), "system");
    }
}
