use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use super::stateless_llm_interface::{ChatMessage, LlmError, StatelessLLMInterface, TokenStream};

/// One canned reaction of a [`ScriptedLLM`]
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Reply(String),
    Fail(u16),
    /// Sleep before replying
    Slow(Duration, String),
}

/// Test double replaying a fixed script and recording the system prompt of every call
#[derive(Debug, Default)]
pub struct ScriptedLLM {
    steps: Mutex<VecDeque<ScriptStep>>,
    systems: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedLLM {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn replies<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::new(replies.into_iter().map(|r| ScriptStep::Reply(r.into())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn system_prompts(&self) -> Vec<String> {
        self.systems.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatelessLLMInterface for ScriptedLLM {
    async fn chat_completion(
        &self,
        _messages: Vec<ChatMessage>,
        system: Option<&str>,
    ) -> Result<TokenStream, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.systems.lock().unwrap().push(system.unwrap_or_default().to_string());
        let step = self.steps.lock().unwrap().pop_front();

        let reply = match step {
            Some(ScriptStep::Reply(reply)) => reply,
            Some(ScriptStep::Fail(status)) => {
                return Err(LlmError::Status { status, body: "scripted failure".to_string() })
            }
            Some(ScriptStep::Slow(delay, reply)) => {
                tokio::time::sleep(delay).await;
                reply
            }
            None => "Nothing further to add.".to_string(),
        };

        let tokens: Vec<Result<String, LlmError>> = reply
            .split_inclusive(' ')
            .map(|token| Ok(token.to_string()))
            .collect();
        Ok(futures::stream::iter(tokens).boxed())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
