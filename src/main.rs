mod agent;
mod config_manager;
mod conversations;
mod handlers;
mod parser;
mod routes;
mod state;

use std::any::Any;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use agent::output_types::ResponsePayload;
use config_manager::{Config, SystemConfig};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("soli_backend=debug,tower_http=debug")),
        )
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let (config, loaded_from) = Config::discover()?;
    match loaded_from {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => warn!("No configuration file found, using defaults and environment"),
    }

    let addr = config.system_config.socket_addr()?;
    let cors = cors_layer(&config.system_config)?;

    let app_state = AppState::new(config)?;
    info!(
        "Advisory panel ready: {} using {}",
        app_state.roster.names().join(", "),
        app_state.llm.model_name()
    );

    let app = Router::new()
        .merge(routes::create_routes())
        .layer(CatchPanicLayer::custom(panic_payload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(system: &SystemConfig) -> Result<CorsLayer> {
    if system.cors_is_permissive() {
        return Ok(CorsLayer::permissive());
    }
    let origins = system
        .cors_allow_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin))
}

/// A panicking handler still answers with a well-formed payload
fn panic_payload(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected panic".to_string()
    };
    error!("Handler panicked: {}", detail);
    Json(ResponsePayload::processing_error(&detail)).into_response()
}
