use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::agent::input_types::ChatRequest;
use crate::agent::output_types::ResponsePayload;
use crate::conversations::handle_chat;
use crate::state::AppState;

pub async fn chat_endpoint(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ResponsePayload> {
    Json(handle_chat(&state, request).await)
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.config.agent_config.llm_provider,
        "model": state.llm.model_name(),
        "agents": state.roster.names(),
    }))
}

pub async fn list_agents(State(state): State<AppState>) -> Json<Value> {
    let agents: Vec<Value> = state
        .roster
        .iter()
        .map(|persona| json!({ "name": persona.name(), "description": persona.description() }))
        .collect();
    Json(json!(agents))
}
