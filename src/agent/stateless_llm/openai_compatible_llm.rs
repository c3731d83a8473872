use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::stateless_llm_interface::{
    ChatMessage, LlmError, StatelessLLMInterface, TokenStream,
};
use crate::config_manager::stateless_llm::OpenAICompatibleConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum SseEvent {
    Token(String),
    Done,
    Skip,
}

/// OpenAI compatible LLM implementation (Groq, OpenAI, Ollama's `/v1` endpoint)
pub struct OpenAICompatibleLLM {
    client: reqwest::Client,
    model: String,
    base_url: String,
    api_key: Option<String>,
    organization_id: Option<String>,
    project_id: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAICompatibleLLM {
    pub fn new(config: &OpenAICompatibleConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            config.model, config.base_url
        );
        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: (!config.api_key_missing()).then(|| config.llm_api_key.clone()),
            organization_id: config.organization_id.clone(),
            project_id: config.project_id.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request_body(&self, messages: Vec<ChatMessage>, system: Option<&str>) -> ChatCompletionRequest<'_> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system {
            wire.push(WireMessage { role: "system", content: sys.to_string() });
        }
        wire.extend(messages.into_iter().map(|msg| WireMessage {
            role: msg.role.as_str(),
            content: msg.content,
        }));

        ChatCompletionRequest {
            model: &self.model,
            messages: wire,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: true,
        }
    }
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        system: Option<&str>,
    ) -> Result<TokenStream, LlmError> {
        let body = self.build_request_body(messages, system);
        debug!("POST {} with {} messages", self.endpoint(), body.messages.len());

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(org) = &self.organization_id {
            request = request.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.project_id {
            request = request.header("OpenAI-Project", project);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        Ok(sse_token_stream(response.bytes_stream().boxed()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Interpret one line of a server-sent event stream
pub(crate) fn parse_sse_line(line: &str) -> Result<SseEvent, LlmError> {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Ok(SseEvent::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::MalformedChunk(format!("{}: {}", e, data)))?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Provider(error.to_string()));
    }

    let token = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();
    if token.is_empty() {
        Ok(SseEvent::Skip)
    } else {
        Ok(SseEvent::Token(token))
    }
}

struct SseState<S> {
    bytes: S,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String, LlmError>>,
    finished: bool,
}

impl<S> SseState<S> {
    fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if !self.handle_line(&String::from_utf8_lossy(&line)) {
                return;
            }
        }
    }

    fn flush(&mut self) {
        let rest = std::mem::take(&mut self.buffer);
        if !rest.is_empty() {
            self.handle_line(&String::from_utf8_lossy(&rest));
        }
        self.finished = true;
    }

    /// Returns false once the stream is over
    fn handle_line(&mut self, line: &str) -> bool {
        match parse_sse_line(line) {
            Ok(SseEvent::Token(token)) => {
                self.pending.push_back(Ok(token));
                true
            }
            Ok(SseEvent::Skip) => true,
            Ok(SseEvent::Done) => {
                self.finish();
                false
            }
            Err(e) => {
                self.pending.push_back(Err(e));
                self.finish();
                false
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.buffer.clear();
    }
}

/// Turn a byte stream of `data:` lines into completion tokens
pub(crate) fn sse_token_stream<S, B, E>(bytes: S) -> TokenStream
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    let state = SseState {
        bytes,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => state.feed(chunk.as_ref()),
                Some(Err(e)) => {
                    state.finish();
                    return Some((Err(e.into()), state));
                }
                None => state.flush(),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::stateless_llm::collect_completion;

    fn config(api_key: &str) -> OpenAICompatibleConfig {
        OpenAICompatibleConfig {
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            llm_api_key: api_key.to_string(),
            model: "llama3-8b-8192".to_string(),
            organization_id: None,
            project_id: None,
            temperature: 0.2,
            max_tokens: None,
        }
    }

    fn chunk(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[test]
    fn request_body_puts_system_first_and_streams() {
        let llm = OpenAICompatibleLLM::new(&config("gsk_test")).unwrap();
        let body = llm.build_request_body(
            vec![ChatMessage::user("Hello"), ChatMessage::assistant("Hi")],
            Some("Be helpful."),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["stream"], true);
        assert!(json.get("max_tokens").is_none());
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "Be helpful.");
        assert_eq!(messages[2]["role"], "assistant");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let llm = OpenAICompatibleLLM::new(&config("gsk_test")).unwrap();
        assert_eq!(llm.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
    }

    #[test]
    fn placeholder_key_is_not_sent() {
        let llm = OpenAICompatibleLLM::new(&config("${GROQ_API_KEY}")).unwrap();
        assert!(llm.api_key.is_none());
    }

    #[test]
    fn parses_sse_lines() {
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), SseEvent::Skip);
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), SseEvent::Done);
        assert_eq!(
            parse_sse_line(chunk("SUMMARY:").trim()).unwrap(),
            SseEvent::Token("SUMMARY:".to_string())
        );
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
            SseEvent::Skip
        );
        assert!(matches!(
            parse_sse_line("data: {not json"),
            Err(LlmError::MalformedChunk(_))
        ));
        assert!(matches!(
            parse_sse_line(r#"data: {"error":{"message":"over capacity"}}"#),
            Err(LlmError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn reassembles_lines_split_across_chunks() {
        let body = format!("{}{}data: [DONE]\n\n", chunk("FINAL ANSWER: "), chunk("Go solar ☀"));
        let bytes = body.into_bytes();
        // the last 21 bytes are `"}}]}` plus the blank line and the DONE line,
        // so this cuts the three-byte sun character in half
        let split_at = bytes.len() - 22;
        let parts: Vec<Result<Vec<u8>, LlmError>> = vec![
            Ok(bytes[..7].to_vec()),
            Ok(bytes[7..split_at].to_vec()),
            Ok(bytes[split_at..].to_vec()),
        ];

        let tokens = sse_token_stream(futures::stream::iter(parts));
        let text = collect_completion(tokens).await.unwrap();
        assert_eq!(text, "FINAL ANSWER: Go solar ☀");
    }

    #[tokio::test]
    async fn stops_reading_after_done() {
        let body = format!("{}data: [DONE]\n\n{}", chunk("one"), chunk("two"));
        let parts: Vec<Result<Vec<u8>, LlmError>> = vec![Ok(body.into_bytes())];

        let tokens: Vec<_> = sse_token_stream(futures::stream::iter(parts)).collect().await;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].as_ref().unwrap(), "one");
    }

    #[tokio::test]
    async fn handles_final_line_without_newline() {
        let parts: Vec<Result<Vec<u8>, LlmError>> = vec![Ok(chunk("tail").trim_end().as_bytes().to_vec())];
        let text = collect_completion(sse_token_stream(futures::stream::iter(parts)))
            .await
            .unwrap();
        assert_eq!(text, "tail");
    }

    #[tokio::test]
    async fn transport_error_ends_stream() {
        let parts: Vec<Result<Vec<u8>, LlmError>> = vec![
            Ok(chunk("partial").into_bytes()),
            Err(LlmError::Status { status: 502, body: String::new() }),
            Ok(chunk("never").into_bytes()),
        ];
        let items: Vec<_> = sse_token_stream(futures::stream::iter(parts)).collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }
}
