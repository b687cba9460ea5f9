mod ai;
mod auth;
mod chat;
mod db;
mod emergency;
mod error;
mod middleware;
mod prediction;
mod routes;
mod state;
#[cfg(test)]
mod test_support;
mod websocket;

use ai::{AiService, OpenAiClient};
use anyhow::Context;
use chat::{ChatRepository, ChatService};
use db::{create_pool, redact_database_url, run_migrations};
use emergency::{emergency_service::EmergencyService, EmergencyRepository};
use prediction::{PredictionRepository, PredictionService};
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use websocket::ConnectionManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,healthconnect_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env().context("Invalid configuration")?);

    let url_for_logging = redact_database_url(&config.database_url);
    tracing::info!("Connecting to database at {}...", url_for_logging);
    let db = create_pool(&config.database_url, config.database_max_connections)
        .await
        .with_context(|| format!("Failed to connect to database at {}", url_for_logging))?;

    // Run migrations
    tracing::info!("Running migrations...");
    run_migrations(&db).await.context("Failed to run migrations")?;

    // AI collaborator
    let ai_client = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    );
    if !ai_client.is_configured() {
        tracing::warn!("OPENAI_API_KEY is not set; AI replies will fail until it is configured");
    }
    let ai_service = AiService::new(Arc::new(ai_client), config.ai_timeout);

    // Create WebSocket connection manager
    let ws_connections = ConnectionManager::new();

    // Create services
    let chat_service = ChatService::new(
        Arc::new(ChatRepository::new(db.clone())),
        ai_service.clone(),
        ws_connections.clone(),
        config.broadcast_scope,
    );
    let emergency_service =
        EmergencyService::new(Arc::new(EmergencyRepository::new(db.clone())), ws_connections.clone());
    let prediction_service =
        PredictionService::new(Arc::new(PredictionRepository::new(db.clone())), ai_service.clone());

    // Create application state
    let state = AppState {
        config: config.clone(),
        ws_connections,
        ai_service,
        chat_service,
        emergency_service,
        prediction_service,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!(
        "Relay starting on http://{} (broadcast scope: {})",
        addr,
        config.broadcast_scope
    );
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
