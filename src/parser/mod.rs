pub mod markers;
pub mod sections;

pub use markers::*;
pub use sections::*;

use std::collections::BTreeMap;

use crate::agent::output_types::{default_quick_replies, ExpertDetails, ResponsePayload, Summary};
use crate::conversations::types::{ConversationOutcome, Termination, Transcript};

pub const NO_RESPONSE_TEXT: &str = "No response from the advisory panel.";
pub const UNANSWERED_TEXT: &str = "I don't know the answer to this yet.";

/// Build the response payload from a finished conversation
pub fn parse_outcome(outcome: &ConversationOutcome) -> ResponsePayload {
    let closing_speaker = match &outcome.termination {
        Termination::TerminatedByMarker { speaker, .. } => Some(speaker.as_str()),
        Termination::RoundLimitReached { .. } => None,
    };
    parse_transcript(&outcome.transcript, closing_speaker)
}

/// Build the response payload from what the agents wrote.
///
/// `closing_speaker` names the agent whose reply ended the exchange, if any.
pub fn parse_transcript(transcript: &Transcript, closing_speaker: Option<&str>) -> ResponsePayload {
    ResponsePayload {
        summary: Summary {
            text: summary_text(transcript, closing_speaker),
            quick_replies: latest(transcript, |content| extract_questions(content).non_empty())
                .unwrap_or_else(default_quick_replies),
            actions: latest(transcript, |content| {
                extract_bullets(content, Marker::PriorityActions).non_empty()
            })
            .unwrap_or_else(Vec::new),
        },
        details: expert_details(transcript),
    }
}

/// Search agent turns newest first and return the first hit
fn latest<T>(transcript: &Transcript, extract: impl Fn(&str) -> Extraction<T>) -> Extraction<T> {
    transcript
        .agent_turns()
        .rev()
        .map(|(_, entry)| extract(&entry.content))
        .find(Extraction::is_found)
        .unwrap_or(Extraction::NotFound)
}

fn summary_text(transcript: &Transcript, closing_speaker: Option<&str>) -> String {
    latest(transcript, |content| extract_section(content, Marker::FinalAnswer).non_empty())
        .or_else(|| latest(transcript, |content| extract_section(content, Marker::Summary).non_empty()))
        .or_else(|| closing_reply(transcript, closing_speaker))
        .unwrap_or_else(|| {
            if transcript.agent_turn_count() > 0 {
                UNANSWERED_TEXT.to_string()
            } else {
                NO_RESPONSE_TEXT.to_string()
            }
        })
}

/// The reply that ended the exchange, after its answer marker when one is
/// written in other letter case, otherwise whole
fn closing_reply(transcript: &Transcript, closing_speaker: Option<&str>) -> Extraction<String> {
    let Some(closing_speaker) = closing_speaker else {
        return Extraction::NotFound;
    };
    let Some((_, entry)) = transcript
        .agent_turns()
        .rev()
        .find(|(speaker, _)| *speaker == closing_speaker)
    else {
        return Extraction::NotFound;
    };

    extract_section_ignore_case(&entry.content, Marker::FinalAnswer)
        .non_empty()
        .or_else(|| Extraction::Found(entry.content.trim().to_string()).non_empty())
}

fn details_from(content: &str) -> ExpertDetails {
    let text = |marker| extract_section(content, marker).non_empty().found();
    let list = |marker| extract_bullets(content, marker).found().unwrap_or_default();

    ExpertDetails {
        technical_insights: text(Marker::TechnicalInsights),
        recommendations: list(Marker::Recommendations),
        financial_analysis: text(Marker::FinancialAnalysis),
        next_steps: list(Marker::NextSteps),
        policy_overview: text(Marker::PolicyOverview),
        incentives: list(Marker::AvailableIncentives),
    }
}

fn expert_details(transcript: &Transcript) -> BTreeMap<String, ExpertDetails> {
    let mut details: BTreeMap<String, ExpertDetails> = BTreeMap::new();
    for (speaker, entry) in transcript.agent_turns() {
        let found = details_from(&entry.content);
        if !found.is_empty() {
            details.entry(speaker.to_string()).or_default().merge_from(found);
        }
    }
    details
}
