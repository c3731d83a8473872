use serde::{Deserialize, Serialize};

/// Configuration for OpenAI-compatible LLM providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompatibleConfig {
    #[serde(rename = "base_url")]
    pub base_url: String,

    #[serde(rename = "llm_api_key")]
    #[serde(default)]
    pub llm_api_key: String,

    pub model: String,

    #[serde(rename = "organization_id")]
    #[serde(default)]
    pub organization_id: Option<String>,

    #[serde(rename = "project_id")]
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(rename = "max_tokens")]
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl OpenAICompatibleConfig {
    /// Whether the key still holds an unresolved `${VAR}` placeholder or is blank.
    pub fn api_key_missing(&self) -> bool {
        let key = self.llm_api_key.trim();
        key.is_empty() || key.starts_with("${")
    }
}

/// Pool of LLM provider configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatelessLLMConfigs {
    #[serde(rename = "groq_llm")]
    pub groq_llm: Option<OpenAICompatibleConfig>,

    #[serde(rename = "openai_llm")]
    pub openai_llm: Option<OpenAICompatibleConfig>,

    #[serde(rename = "openai_compatible_llm")]
    pub openai_compatible_llm: Option<OpenAICompatibleConfig>,

    #[serde(rename = "ollama_llm")]
    pub ollama_llm: Option<OpenAICompatibleConfig>,
}

impl StatelessLLMConfigs {
    pub fn get(&self, llm_provider: &str) -> Option<&OpenAICompatibleConfig> {
        match llm_provider {
            "groq_llm" => self.groq_llm.as_ref(),
            "openai_llm" => self.openai_llm.as_ref(),
            "openai_compatible_llm" => self.openai_compatible_llm.as_ref(),
            "ollama_llm" => self.ollama_llm.as_ref(),
            _ => None,
        }
    }
}

impl Default for StatelessLLMConfigs {
    fn default() -> Self {
        Self {
            groq_llm: Some(OpenAICompatibleConfig {
                base_url: "https://api.groq.com/openai/v1".to_string(),
                llm_api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
                model: "llama3-8b-8192".to_string(),
                organization_id: None,
                project_id: None,
                temperature: default_temperature(),
                max_tokens: None,
            }),
            openai_llm: None,
            openai_compatible_llm: None,
            ollama_llm: None,
        }
    }
}
