use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::websocket::ConversationKey;

/// Who wrote a message. Exactly one origin per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Ai,
    Doctor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: String,
    pub doctor_id: Option<String>,
    pub message: String,
    pub sender: MessageSender,
    pub message_type: MessageType,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::new(self.user_id.clone(), self.doctor_id.clone())
    }
}

/// Wire form of a chat message. Keeps the `isFromAI` / `isFromDoctor` flags
/// browser clients read, derived from the single `sender` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: Uuid,
    pub user_id: String,
    pub doctor_id: Option<String>,
    pub message: String,
    pub sender: MessageSender,
    #[serde(rename = "isFromAI")]
    pub is_from_ai: bool,
    pub is_from_doctor: bool,
    pub message_type: MessageType,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            is_from_ai: message.sender == MessageSender::Ai,
            is_from_doctor: message.sender == MessageSender::Doctor,
            user_id: message.user_id,
            doctor_id: message.doctor_id,
            message: message.message,
            sender: message.sender,
            message_type: message.message_type,
            metadata: message.metadata,
            created_at: message.created_at,
        }
    }
}

/// A message about to be stored. Only the constructors below build one, so
/// the sender always matches the conversation shape (a doctor message always
/// names its doctor).
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub user_id: String,
    pub doctor_id: Option<String>,
    pub message: String,
    pub sender: MessageSender,
    pub message_type: MessageType,
    pub metadata: Option<serde_json::Value>,
}

impl NewChatMessage {
    pub fn from_user(user_id: impl Into<String>, doctor_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            doctor_id,
            message: message.into(),
            sender: MessageSender::User,
            message_type: MessageType::Text,
            metadata: None,
        }
    }

    pub fn from_ai(
        user_id: impl Into<String>,
        message: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            doctor_id: None,
            message: message.into(),
            sender: MessageSender::Ai,
            message_type: MessageType::Text,
            metadata,
        }
    }

    pub fn from_doctor(
        user_id: impl Into<String>,
        doctor_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            doctor_id: Some(doctor_id.into()),
            message: message.into(),
            sender: MessageSender::Doctor,
            message_type: MessageType::Text,
            metadata: None,
        }
    }

    pub fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }
}
