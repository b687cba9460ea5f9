use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    ai::{ConversationTurn, SymptomAnalysis},
    chat::chat_models::ChatMessageResponse,
    emergency::emergency_models::{EmergencyLog, NewEmergencyLog},
};

/// Identifies one conversation: a user talking either to the AI assistant
/// (`doctor_id == None`) or to a specific doctor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationKey {
    pub user_id: String,
    pub doctor_id: Option<String>,
}

impl ConversationKey {
    pub fn new(user_id: impl Into<String>, doctor_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            doctor_id,
        }
    }
}

// Server-to-client events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    ChatMessage(ChatMessagePayload),
    AiResponse(AiResponsePayload),
    EmergencyAlert(EmergencyAlertPayload),
    Error(ErrorPayload),
    Ping,
    Pong,
}

impl WsMessage {
    pub fn error(message: impl Into<String>) -> Self {
        WsMessage::Error(ErrorPayload {
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub data: ChatMessageResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponsePayload {
    pub data: ChatMessageResponse,
    pub analysis: Option<SymptomAnalysis>,
    pub followup_questions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyAlertPayload {
    pub data: EmergencyLog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

// Client-to-server envelopes
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ChatMessage(ChatEnvelope),
    Emergency(EmergencyEnvelope),
    JoinConversation(JoinConversationEnvelope),
    Ping,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatEnvelope {
    pub user_id: Option<String>,
    pub doctor_id: Option<String>,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyEnvelope {
    pub user_id: Option<String>,
    pub emergency_data: NewEmergencyLog,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinConversationEnvelope {
    pub user_id: String,
    pub doctor_id: Option<String>,
}
