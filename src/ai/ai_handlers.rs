use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    ai::ai_models::{AiChatRequest, ChatResponse, SymptomAnalysis, SymptomQuery},
    error::Result,
    middleware::AuthUser,
    state::AppState,
};

/// Analyze a set of symptoms without storing anything
#[utoipa::path(
    post,
    path = "/api/ai/analyze-symptoms",
    tag = "ai",
    request_body = SymptomQuery,
    responses(
        (status = 200, description = "Symptom analysis", body = SymptomAnalysis),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "AI service failure"),
        (status = 504, description = "AI service timed out")
    ),
    security(("bearer_auth" = []))
)]
pub async fn analyze_symptoms(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(payload): Json<SymptomQuery>,
) -> Result<Json<SymptomAnalysis>> {
    payload.validate()?;
    let analysis = state.ai_service.analyze_symptoms(&payload).await?;
    Ok(Json(analysis))
}

/// One-off AI chat reply; nothing is persisted or broadcast
#[utoipa::path(
    post,
    path = "/api/ai/chat",
    tag = "ai",
    request_body = AiChatRequest,
    responses(
        (status = 200, description = "Generated reply", body = ChatResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "AI service failure"),
        (status = 504, description = "AI service timed out")
    ),
    security(("bearer_auth" = []))
)]
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(payload): Json<AiChatRequest>,
) -> Result<Json<ChatResponse>> {
    payload.validate()?;
    let response = state
        .ai_service
        .chat(&payload.message, &payload.conversation_history)
        .await?;
    Ok(Json(response))
}
