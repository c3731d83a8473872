use serde::{Deserialize, Serialize};
use crate::config_manager::stateless_llm::StatelessLLMConfigs;

/// A persona entry in the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub instructions: String,

    /// Overrides `AgentConfig::termination_marker` for this persona
    #[serde(rename = "termination_marker")]
    #[serde(default)]
    pub termination_marker: Option<String>,
}

/// Backoff settings for retrying transient LLM failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Configuration for the advisory panel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    #[serde(rename = "llm_provider")]
    pub llm_provider: String, // "groq_llm", "openai_llm", "openai_compatible_llm", "ollama_llm"

    /// Upper bound on agent turns per conversation; the roster size when unset
    #[serde(rename = "max_rounds")]
    pub max_rounds: Option<usize>,

    #[serde(rename = "termination_marker")]
    pub termination_marker: String,

    #[serde(rename = "turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    #[serde(rename = "conversation_timeout_secs")]
    pub conversation_timeout_secs: u64,

    pub retry: RetryConfig,

    pub personas: Vec<PersonaConfig>,

    #[serde(rename = "llm_configs")]
    pub llm_configs: StatelessLLMConfigs,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let personas = default_personas();
        Self {
            llm_provider: "groq_llm".to_string(),
            max_rounds: None,
            termination_marker: "FINAL ANSWER:".to_string(),
            turn_timeout_secs: 60,
            conversation_timeout_secs: 240,
            retry: RetryConfig::default(),
            personas,
            llm_configs: StatelessLLMConfigs::default(),
        }
    }
}

impl AgentConfig {
    pub fn max_rounds(&self) -> usize {
        self.max_rounds.unwrap_or(self.personas.len())
    }
}

fn persona(name: &str, description: &str, instructions: &str) -> PersonaConfig {
    PersonaConfig {
        name: name.to_string(),
        description: description.to_string(),
        instructions: instructions.to_string(),
        termination_marker: None,
    }
}

/// Built-in roster, in speaking order
pub fn default_personas() -> Vec<PersonaConfig> {
    vec![
        persona(
            "Solar_Advisor",
            "Explains solar concepts, system sizing and the installation process.",
            "You are a knowledgeable solar energy advisor. Help users understand solar energy \
concepts, the installation process, and guide them through the necessary steps for installation.
- Be direct, concise, and provide actionable insights.
- Structure your reply exactly as:
TECHNICAL INSIGHTS:
<two or three sentences>
RECOMMENDATIONS:
• <recommendation>
• <recommendation>
- Do not write FINAL ANSWER: yourself; the coordinator closes the conversation.",
        ),
        persona(
            "Financial_Expert",
            "Evaluates costs, savings, ROI and financing options.",
            "You are a financial expert specializing in solar energy. Assist users in evaluating \
the costs, savings, and return on investment (ROI) for solar projects, as well as guiding them \
through incentives and financial options.
- Build on what the solar advisor said; do not repeat it.
- Structure your reply exactly as:
FINANCIAL ANALYSIS:
<two or three sentences with rough numbers where possible>
NEXT STEPS:
• <step>
• <step>
- Do not write FINAL ANSWER: yourself.",
        ),
        persona(
            "Policy_Expert",
            "Covers government incentives, tax credits and regulations.",
            "You are an expert in solar energy policies and incentives. Guide users through \
available government incentives, tax credits, and regulations that may affect their solar \
installation decisions.
- Structure your reply exactly as:
POLICY OVERVIEW:
<two or three sentences>
AVAILABLE INCENTIVES:
• <incentive>
• <incentive>
- Do not write FINAL ANSWER: yourself.",
        ),
        persona(
            "Follow_Up_Agent",
            "Suggests the questions the user is most likely to ask next.",
            "You read the conversation so far and suggest follow-up questions the user is likely \
to ask next about their solar project.
- Reply with exactly this format and nothing else:
SUGGESTED QUESTIONS:
[1] <question>
[2] <question>
[3] <question>
- Keep each question under 12 words.
- Do not write FINAL ANSWER: yourself.",
        ),
        persona(
            "Coordinator",
            "Merges the experts' input into a short answer for the user.",
            "You are the coordinator of a panel of solar experts. Combine the technical, \
financial and policy input above into one answer for the user.
- Structure your reply exactly as:
SUMMARY:
<three or four sentences>
PRIORITY ACTIONS:
• <action>
• <action>
FINAL ANSWER: <the answer to the user's question in one short paragraph>
- If you cannot provide a complete answer, still use 'FINAL ANSWER:' followed by the most \
helpful information you can offer.",
        ),
    ]
}
