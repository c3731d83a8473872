use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    pub message: String,
    /// Set by the frontend when the chat window first opens
    #[serde(default)]
    pub is_initial_greeting: bool,
}

#[cfg(test)]
impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_initial_greeting: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_flag_defaults_to_false() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request, ChatRequest::new("hi"));
    }

    #[test]
    fn message_is_required() {
        assert!(serde_json::from_str::<ChatRequest>(r#"{"is_initial_greeting":true}"#).is_err());
    }
}
