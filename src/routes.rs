use crate::{
    ai::{
        ai_handlers,
        ai_models::{AiChatRequest, ChatResponse, ChatRole, ConversationTurn, DiseaseCandidate, SymptomAnalysis, SymptomQuery},
    },
    chat::{
        chat_dto::SendChatMessageRequest,
        chat_handlers,
        chat_models::{ChatMessageResponse, MessageSender, MessageType},
    },
    emergency::{
        emergency_handlers,
        emergency_models::{EmergencyLevel, EmergencyLog, NewEmergencyLog, ResolveEmergencyRequest},
    },
    middleware::auth_middleware,
    prediction::{
        prediction_handlers,
        prediction_models::{DiseasePrediction, PredictionResponse},
    },
    state::AppState,
};
use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::chat::chat_handlers::send_message,
        crate::chat::chat_handlers::get_messages,
        crate::emergency::emergency_handlers::create_emergency,
        crate::emergency::emergency_handlers::get_emergencies,
        crate::emergency::emergency_handlers::get_active_emergencies,
        crate::emergency::emergency_handlers::resolve_emergency,
        crate::ai::ai_handlers::analyze_symptoms,
        crate::ai::ai_handlers::chat,
        crate::prediction::prediction_handlers::create_prediction,
        crate::prediction::prediction_handlers::get_predictions,
    ),
    components(
        schemas(
            SendChatMessageRequest,
            ChatMessageResponse,
            MessageSender,
            MessageType,
            EmergencyLevel,
            EmergencyLog,
            NewEmergencyLog,
            ResolveEmergencyRequest,
            SymptomQuery,
            SymptomAnalysis,
            DiseaseCandidate,
            AiChatRequest,
            ChatResponse,
            ChatRole,
            ConversationTurn,
            DiseasePrediction,
            PredictionResponse,
        )
    ),
    tags(
        (name = "chat", description = "Chat history and message endpoints"),
        (name = "emergency", description = "Emergency log endpoints"),
        (name = "ai", description = "AI assistant endpoints"),
        (name = "prediction", description = "Disease prediction endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connections": state.ws_connections.connection_count(),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    // Protected routes (auth required)
    let chat_routes = Router::new()
        .route(
            "/messages",
            get(chat_handlers::get_messages).post(chat_handlers::send_message),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let emergency_routes = Router::new()
        .route(
            "/",
            get(emergency_handlers::get_emergencies).post(emergency_handlers::create_emergency),
        )
        .route("/active", get(emergency_handlers::get_active_emergencies))
        .route("/:id/resolve", put(emergency_handlers::resolve_emergency))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let ai_routes = Router::new()
        .route("/analyze-symptoms", post(ai_handlers::analyze_symptoms))
        .route("/chat", post(ai_handlers::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let prediction_routes = Router::new()
        .route(
            "/",
            get(prediction_handlers::get_predictions).post(prediction_handlers::create_prediction),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // The relay authenticates through the optional `?token=` query parameter.
    // Existing clients connect to `/ws`; `/api/ws` serves the same handler.
    let ws_routes = Router::new().route("/ws", get(crate::websocket::ws_handler));

    let api_routes = Router::new()
        .nest("/chat", chat_routes)
        .nest("/emergency", emergency_routes)
        .nest("/ai", ai_routes)
        .nest("/prediction", prediction_routes)
        .merge(ws_routes.clone());

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .merge(ws_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
