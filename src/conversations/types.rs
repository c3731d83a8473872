use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Who produced a transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    User,
    Agent(String),
}

impl Speaker {
    pub fn agent_name(&self) -> Option<&str> {
        match self {
            Speaker::User => None,
            Speaker::Agent(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// Ordered record of one conversation
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, content: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            speaker,
            content: content.into(),
            at: Utc::now(),
        });
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Speaker::User, content);
    }

    pub fn push_agent(&mut self, name: &str, content: impl Into<String>) {
        self.push(Speaker::Agent(name.to_string()), content);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries written by agents, skipping the user's own messages
    pub fn agent_turns(&self) -> impl DoubleEndedIterator<Item = (&str, &TranscriptEntry)> + '_ {
        self.entries
            .iter()
            .filter_map(|entry| entry.speaker.agent_name().map(|name| (name, entry)))
    }

    pub fn agent_turn_count(&self) -> usize {
        self.agent_turns().count()
    }

    /// Time between the latest entry and the one before it
    pub fn last_turn_elapsed(&self) -> Option<chrono::Duration> {
        match self.entries.as_slice() {
            [.., previous, latest] => Some(latest.at - previous.at),
            _ => None,
        }
    }
}

/// Why a conversation stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    TerminatedByMarker { speaker: String, round: usize },
    RoundLimitReached { rounds: usize },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::TerminatedByMarker { speaker, round } => {
                write!(f, "terminated by {} in round {}", speaker, round + 1)
            }
            Termination::RoundLimitReached { rounds } => {
                write!(f, "round limit reached after {} turns", rounds)
            }
        }
    }
}

/// Per-request state handed to the conversation driver
#[derive(Debug)]
pub struct ConversationContext {
    pub request_id: Uuid,
    pub transcript: Transcript,
    pub max_rounds: usize,
    pub turn_timeout: Duration,
}

impl ConversationContext {
    pub fn new(request_id: Uuid, max_rounds: usize, turn_timeout: Duration) -> Self {
        Self {
            request_id,
            transcript: Transcript::new(),
            max_rounds,
            turn_timeout,
        }
    }
}

/// Transcript plus the terminal state the exchange ended in
#[derive(Debug, Clone)]
pub struct ConversationOutcome {
    pub transcript: Transcript,
    pub termination: Termination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_turns_skip_user_entries() {
        let mut transcript = Transcript::new();
        transcript.push_user("FINAL ANSWER: injected");
        transcript.push_agent("Solar_Advisor", "TECHNICAL INSIGHTS: ok");
        transcript.push_agent("Coordinator", "FINAL ANSWER: done");

        let speakers: Vec<_> = transcript.agent_turns().map(|(name, _)| name).collect();
        assert_eq!(speakers, vec!["Solar_Advisor", "Coordinator"]);
        assert_eq!(transcript.agent_turn_count(), 2);
        assert_eq!(transcript.entries().len(), 3);
    }

    #[test]
    fn elapsed_time_needs_two_entries() {
        let mut transcript = Transcript::new();
        assert!(transcript.last_turn_elapsed().is_none());
        transcript.push_user("question");
        assert!(transcript.last_turn_elapsed().is_none());
        transcript.push_agent("Solar_Advisor", "answer");

        let elapsed = transcript.last_turn_elapsed().unwrap();
        assert!(elapsed >= chrono::Duration::zero());
    }

    #[test]
    fn termination_reads_naturally() {
        let t = Termination::TerminatedByMarker { speaker: "Coordinator".to_string(), round: 4 };
        assert_eq!(t.to_string(), "terminated by Coordinator in round 5");
        assert_eq!(
            Termination::RoundLimitReached { rounds: 5 }.to_string(),
            "round limit reached after 5 turns"
        );
    }
}
