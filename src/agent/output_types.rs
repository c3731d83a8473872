use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const GREETING_TEXT: &str =
    "👋 Hello! I'm Soli, your solar energy assistant. How can I help you today?";

/// Example questions offered when the panel suggested none
pub const DEFAULT_QUICK_REPLIES: [&str; 3] = [
    "What solar incentives are available in my area?",
    "How long do solar panels last?",
    "What's the installation process like?",
];

pub fn default_quick_replies() -> Vec<String> {
    DEFAULT_QUICK_REPLIES.iter().map(|q| q.to_string()).collect()
}

/// Headline answer shown in the chat bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    pub quick_replies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

/// Sections one expert contributed to the conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_insights: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_overview: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incentives: Vec<String>,
}

impl ExpertDetails {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay the fields `newer` carries, keeping ours where it has none
    pub fn merge_from(&mut self, newer: ExpertDetails) {
        if newer.technical_insights.is_some() {
            self.technical_insights = newer.technical_insights;
        }
        if !newer.recommendations.is_empty() {
            self.recommendations = newer.recommendations;
        }
        if newer.financial_analysis.is_some() {
            self.financial_analysis = newer.financial_analysis;
        }
        if !newer.next_steps.is_empty() {
            self.next_steps = newer.next_steps;
        }
        if newer.policy_overview.is_some() {
            self.policy_overview = newer.policy_overview;
        }
        if !newer.incentives.is_empty() {
            self.incentives = newer.incentives;
        }
    }
}

/// Body of every `POST /chat` response, success or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub summary: Summary,
    /// Keyed by agent name; ordered so output is byte-stable
    pub details: BTreeMap<String, ExpertDetails>,
}

impl ResponsePayload {
    pub fn greeting() -> Self {
        Self::fallback(GREETING_TEXT)
    }

    /// Well-formed payload carrying only a message and the example questions
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            summary: Summary {
                text: text.into(),
                quick_replies: default_quick_replies(),
                actions: Vec::new(),
            },
            details: BTreeMap::new(),
        }
    }

    pub fn processing_error(error: &dyn std::fmt::Display) -> Self {
        Self::fallback(format!("Error processing your request: {}", error))
    }
}
