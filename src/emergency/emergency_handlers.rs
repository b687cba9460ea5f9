use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    emergency::emergency_models::{EmergencyLog, NewEmergencyLog, ResolveEmergencyRequest},
    error::Result,
    middleware::AuthUser,
    state::AppState,
};

/// Log an emergency for the authenticated user and alert connected clients
#[utoipa::path(
    post,
    path = "/api/emergency",
    tag = "emergency",
    request_body = NewEmergencyLog,
    responses(
        (status = 201, description = "Emergency logged", body = EmergencyLog),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_emergency(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(mut payload): Json<NewEmergencyLog>,
) -> Result<impl IntoResponse> {
    payload.user_id = Some(claims.sub);
    let log = state.emergency_service.raise(payload).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// Emergencies logged by the authenticated user
#[utoipa::path(
    get,
    path = "/api/emergency",
    tag = "emergency",
    responses(
        (status = 200, description = "Emergency logs, newest first", body = Vec<EmergencyLog>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_emergencies(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<EmergencyLog>>> {
    let logs = state.emergency_service.list_for_user(auth.user_id()).await?;
    Ok(Json(logs))
}

/// All unresolved emergencies
#[utoipa::path(
    get,
    path = "/api/emergency/active",
    tag = "emergency",
    responses(
        (status = 200, description = "Unresolved emergencies", body = Vec<EmergencyLog>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_active_emergencies(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<Vec<EmergencyLog>>> {
    let logs = state.emergency_service.list_active().await?;
    Ok(Json(logs))
}

/// Mark an emergency as resolved
#[utoipa::path(
    put,
    path = "/api/emergency/{id}/resolve",
    tag = "emergency",
    params(
        ("id" = Uuid, Path, description = "Emergency ID")
    ),
    request_body = ResolveEmergencyRequest,
    responses(
        (status = 200, description = "Emergency resolved", body = EmergencyLog),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Emergency not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn resolve_emergency(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveEmergencyRequest>,
) -> Result<Json<EmergencyLog>> {
    let log = state
        .emergency_service
        .resolve(id, payload.assigned_doctor_id.as_deref())
        .await?;
    Ok(Json(log))
}
