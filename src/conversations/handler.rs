use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::agent::input_types::ChatRequest;
use crate::agent::output_types::ResponsePayload;
use crate::conversations::driver::run_conversation;
use crate::conversations::error::ConversationError;
use crate::conversations::types::ConversationContext;
use crate::conversations::utils::preview;
use crate::parser::parse_outcome;
use crate::state::AppState;

/// Answer one chat request. Never fails: errors become a fallback payload.
pub async fn handle_chat(state: &AppState, request: ChatRequest) -> ResponsePayload {
    if request.is_initial_greeting {
        info!("Sending initial greeting");
        return ResponsePayload::greeting();
    }

    let request_id = Uuid::new_v4();
    async move {
        info!("Received message: {}", preview(&request.message, 200));
        match converse(state, request_id, &request.message).await {
            Ok(payload) => {
                info!("Summary: {}", preview(&payload.summary.text, 200));
                payload
            }
            Err(e) => {
                error!("Error processing request: {}", e);
                ResponsePayload::processing_error(&e)
            }
        }
    }
    .instrument(info_span!("chat", %request_id))
    .await
}

/// Run the panel on `message` within the conversation time limit and parse the result
pub async fn converse(
    state: &AppState,
    request_id: Uuid,
    message: &str,
) -> Result<ResponsePayload, ConversationError> {
    let agent_config = &state.config.agent_config;
    let ctx = ConversationContext::new(
        request_id,
        agent_config.max_rounds(),
        Duration::from_secs(agent_config.turn_timeout_secs),
    );
    let limit = Duration::from_secs(agent_config.conversation_timeout_secs);

    let outcome = timeout(limit, run_conversation(&state.roster, state.llm.as_ref(), ctx, message))
        .await
        .map_err(|_| ConversationError::ConversationTimeout { timeout: limit })??;

    Ok(parse_outcome(&outcome))
}
