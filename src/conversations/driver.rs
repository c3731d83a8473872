use tokio::time::timeout;
use tracing::{debug, info};

use crate::agent::agents::AgentRoster;
use crate::agent::stateless_llm::StatelessLLMInterface;
use crate::conversations::error::ConversationError;
use crate::conversations::types::{ConversationContext, ConversationOutcome, Termination};
use crate::conversations::utils::{frame_user_query, preview};

/// Position of the exchange between turns
#[derive(Debug, Clone, PartialEq, Eq)]
enum TurnState {
    AwaitingTurn { round: usize },
    TurnComplete { round: usize, speaker: String, matched_marker: bool },
    TerminatedByMarker { speaker: String, round: usize },
    RoundLimitReached { rounds: usize },
}

/// Run a round-robin exchange among `roster` about `user_message`.
///
/// Stops on the first reply that satisfies its speaker's termination
/// predicate, or after `ctx.max_rounds` agent turns. Each turn is bounded by
/// `ctx.turn_timeout`.
pub async fn run_conversation(
    roster: &AgentRoster,
    llm: &dyn StatelessLLMInterface,
    mut ctx: ConversationContext,
    user_message: &str,
) -> Result<ConversationOutcome, ConversationError> {
    if roster.is_empty() {
        return Err(ConversationError::NoAgents);
    }

    ctx.transcript.push_user(frame_user_query(user_message));

    let mut state = if ctx.max_rounds == 0 {
        TurnState::RoundLimitReached { rounds: 0 }
    } else {
        TurnState::AwaitingTurn { round: 0 }
    };

    loop {
        state = match state {
            TurnState::AwaitingTurn { round } => {
                let persona = roster.speaker_for(round).ok_or(ConversationError::NoAgents)?;
                let speaker = persona.name().to_string();

                let reply = match timeout(ctx.turn_timeout, persona.generate_reply(llm, &ctx.transcript)).await {
                    Ok(Ok(reply)) => reply,
                    Ok(Err(source)) => return Err(ConversationError::Llm { speaker, source }),
                    Err(_) => {
                        return Err(ConversationError::TurnTimeout {
                            speaker,
                            timeout: ctx.turn_timeout,
                        })
                    }
                };

                debug!("{}: {}", speaker, preview(&reply, 160));
                let reply_len = reply.len();
                let matched_marker = persona.is_termination_msg(&reply);
                ctx.transcript.push_agent(&speaker, reply);

                let elapsed_ms = ctx
                    .transcript
                    .last_turn_elapsed()
                    .map(|elapsed| elapsed.num_milliseconds())
                    .unwrap_or_default();
                info!(
                    request_id = %ctx.request_id,
                    speaker = %speaker,
                    round = round + 1,
                    reply_len,
                    elapsed_ms,
                    "turn complete"
                );
                TurnState::TurnComplete { round, speaker, matched_marker }
            }
            TurnState::TurnComplete { round, speaker, matched_marker: true } => {
                TurnState::TerminatedByMarker { speaker, round }
            }
            TurnState::TurnComplete { round, .. } if round + 1 >= ctx.max_rounds => {
                TurnState::RoundLimitReached { rounds: round + 1 }
            }
            TurnState::TurnComplete { round, .. } => TurnState::AwaitingTurn { round: round + 1 },
            TurnState::TerminatedByMarker { speaker, round } => {
                return Ok(finish(ctx, Termination::TerminatedByMarker { speaker, round }));
            }
            TurnState::RoundLimitReached { rounds } => {
                return Ok(finish(ctx, Termination::RoundLimitReached { rounds }));
            }
        };
    }
}

fn finish(ctx: ConversationContext, termination: Termination) -> ConversationOutcome {
    info!(request_id = %ctx.request_id, "conversation {}", termination);
    ConversationOutcome {
        transcript: ctx.transcript,
        termination,
    }
}
