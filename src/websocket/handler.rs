use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use validator::Validate;

use crate::{
    auth::{jwt::DOCTOR_ROLE, verify_jwt},
    error::{AppError, Result},
    state::AppState,
    websocket::{
        connection::{ConnectionId, ConnectionIdentity},
        types::{ClientMessage, ConversationKey, WsMessage},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Chat relay WebSocket.
///
/// A `?token=` query parameter authenticates the connection up front; without
/// it the connection is anonymous and takes its user from the first envelope
/// that names one.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Result<Response> {
    let identity = match query.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => {
            let claims = verify_jwt(token, &state.config.jwt_secret)?;
            if claims.sub.trim().is_empty() {
                return Err(AppError::Unauthorized("Invalid token".to_string()));
            }
            ConnectionIdentity {
                user_id: Some(claims.sub),
                role: claims.role,
                authenticated: true,
            }
        }
        None => ConnectionIdentity::default(),
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, identity, state)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, identity: ConnectionIdentity, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let user_label = identity.user_id.clone().unwrap_or_else(|| "anonymous".to_string());
    let connection_id = state.ws_connections.add_connection(identity, tx.clone());
    tracing::info!(
        "Relay connection {} opened for {} ({} open)",
        connection_id,
        user_label,
        state.ws_connections.connection_count()
    );

    // Task: send messages from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!("Failed to encode relay event: {}", e),
            }
        }
    });

    // Task: receive frames in order; each one is fully handled before the next
    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_frame(&text, connection_id, &state_clone).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Heartbeat task
    let heartbeat = state.config.ws_heartbeat;
    let tx_heartbeat = tx;
    let mut heartbeat_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(heartbeat);
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx_heartbeat.send(WsMessage::Ping).is_err() {
                break;
            }
        }
    });

    // Stop all tasks when any one finishes
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            heartbeat_task.abort();
        },
        _ = &mut recv_task => {
            send_task.abort();
            heartbeat_task.abort();
        },
        _ = &mut heartbeat_task => {
            send_task.abort();
            recv_task.abort();
        }
    }

    // Cleanup
    state.ws_connections.remove_connection(&connection_id);
    tracing::info!(
        "Relay connection {} closed ({} open)",
        connection_id,
        state.ws_connections.connection_count()
    );
}

/// Run one inbound frame. Failures go back to the sending connection only, as
/// an `error` event.
async fn handle_frame(text: &str, connection_id: ConnectionId, state: &AppState) {
    if let Err(e) = process_client_message(text, connection_id, state).await {
        tracing::warn!("Relay frame from connection {} failed: {}", connection_id, e);
        state
            .ws_connections
            .send_to_connection(&connection_id, WsMessage::error(e.client_message()));
    }
}

async fn process_client_message(
    text: &str,
    connection_id: ConnectionId,
    state: &AppState,
) -> Result<()> {
    let client_msg: ClientMessage = serde_json::from_str(text)
        .map_err(|e| AppError::BadRequest(format!("Invalid message format: {}", e)))?;

    match client_msg {
        ClientMessage::ChatMessage(envelope) => {
            envelope.validate()?;

            let user_id = connection_user(state, connection_id, envelope.user_id)?
                .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;
            let doctor_id = envelope.doctor_id.filter(|id| !id.is_empty());

            state.ws_connections.join_conversation(
                connection_id,
                ConversationKey::new(user_id.clone(), doctor_id.clone()),
            );

            let relayed = state
                .chat_service
                .relay_user_message(
                    &user_id,
                    doctor_id,
                    &envelope.message,
                    &envelope.conversation_history,
                )
                .await?;
            tracing::debug!(
                "Relayed message {} for {} (AI reply: {:?})",
                relayed.user_message.id,
                user_id,
                relayed.ai_message.map(|m| m.id)
            );
        }

        ClientMessage::Emergency(envelope) => {
            let mut new_log = envelope.emergency_data;
            let claimed = new_log.user_id.take().or(envelope.user_id);
            new_log.user_id = connection_user(state, connection_id, claimed)?;

            state.emergency_service.raise(new_log).await?;
        }

        ClientMessage::JoinConversation(envelope) => {
            let identity = state
                .ws_connections
                .identity(&connection_id)
                .ok_or(AppError::InternalError)?;
            let is_doctor = identity.authenticated && identity.role.as_deref() == Some(DOCTOR_ROLE);
            if !is_doctor {
                connection_user(state, connection_id, Some(envelope.user_id.clone()))?;
            }

            let key = ConversationKey::new(
                envelope.user_id,
                envelope.doctor_id.filter(|id| !id.is_empty()),
            );
            state.ws_connections.join_conversation(connection_id, key.clone());
            tracing::debug!(
                "Connection {} joined conversation {:?} ({} member(s))",
                connection_id,
                key,
                state.ws_connections.conversation_members(&key)
            );
        }

        ClientMessage::Ping => {
            state
                .ws_connections
                .send_to_connection(&connection_id, WsMessage::Pong);
        }
    }

    Ok(())
}

/// The user a frame acts for.
///
/// Authenticated connections always act as their token subject and a
/// different `claimed` id is rejected. Anonymous connections are bound to the
/// first id they claim and must keep using it.
fn connection_user(
    state: &AppState,
    connection_id: ConnectionId,
    claimed: Option<String>,
) -> Result<Option<String>> {
    let identity = state
        .ws_connections
        .identity(&connection_id)
        .ok_or(AppError::InternalError)?;
    let claimed = claimed.filter(|id| !id.trim().is_empty());
    let mismatch = || AppError::Forbidden("userId does not match this connection".to_string());

    if identity.authenticated {
        return match claimed {
            Some(claimed) if identity.user_id.as_deref() != Some(claimed.as_str()) => Err(mismatch()),
            _ => Ok(identity.user_id),
        };
    }

    match claimed {
        Some(claimed) => {
            if !state.ws_connections.bind_user(&connection_id, &claimed) {
                return Err(mismatch());
            }
            Ok(Some(claimed))
        }
        None => Ok(identity.user_id),
    }
}
