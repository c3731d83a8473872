use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{chat_endpoint, health_check, list_agents};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat_endpoint))
        .route("/api/health", get(health_check))
        .route("/api/agents", get(list_agents))
}
