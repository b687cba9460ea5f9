use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    chat::{
        chat_dto::{ChatHistoryQuery, PaginatedResponse, SendChatMessageRequest},
        chat_models::{ChatMessageResponse, NewChatMessage},
    },
    error::{AppError, Result},
    middleware::AuthUser,
    state::AppState,
};

/// Store a chat message and deliver it to connected clients
#[utoipa::path(
    post,
    path = "/api/chat/messages",
    tag = "chat",
    request_body = SendChatMessageRequest,
    responses(
        (status = 201, description = "Message stored and delivered", body = ChatMessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Doctor posting under another doctor's id")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SendChatMessageRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let doctor_id = payload.doctor_id.filter(|id| !id.is_empty());
    let new_message = match doctor_id {
        Some(doctor_id) if auth.is_doctor() => {
            if doctor_id != auth.user_id() {
                return Err(AppError::Forbidden(
                    "Doctors can only post as themselves".to_string(),
                ));
            }
            let patient_id = payload
                .user_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;
            NewChatMessage::from_doctor(patient_id, doctor_id, payload.message)
        }
        doctor_id => NewChatMessage::from_user(auth.user_id(), doctor_id, payload.message),
    }
    .with_message_type(payload.message_type);

    let message = state.chat_service.send_message(new_message).await?;

    Ok((StatusCode::CREATED, Json(ChatMessageResponse::from(message))))
}

/// Chat history of the authenticated user
#[utoipa::path(
    get,
    path = "/api/chat/messages",
    tag = "chat",
    params(ChatHistoryQuery),
    responses(
        (status = 200, description = "Paginated messages, newest first", body = PaginatedResponse<ChatMessageResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ChatHistoryQuery>,
) -> Result<Json<PaginatedResponse<ChatMessageResponse>>> {
    let (messages, total) = state
        .chat_service
        .get_messages_with_count(
            auth.user_id(),
            query.doctor_id(),
            query.limit() as i64,
            query.offset(),
        )
        .await?;

    let data = messages.into_iter().map(ChatMessageResponse::from).collect();

    Ok(Json(PaginatedResponse::new(data, total, query.page(), query.limit())))
}
