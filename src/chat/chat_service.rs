use std::sync::Arc;

use crate::{
    ai::{AiService, ConversationTurn},
    chat::{
        chat_models::{ChatMessage, NewChatMessage},
        chat_repository::ChatStore,
    },
    error::{AppError, Result},
    websocket::{
        types::{AiResponsePayload, ChatMessagePayload},
        BroadcastScope, ConnectionManager, ConversationKey, WsMessage,
    },
};

/// Messages created while relaying one inbound chat message.
#[derive(Debug, Clone)]
pub struct RelayedChat {
    pub user_message: ChatMessage,
    pub ai_message: Option<ChatMessage>,
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    ai: AiService,
    ws_manager: ConnectionManager,
    scope: BroadcastScope,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ChatStore>,
        ai: AiService,
        ws_manager: ConnectionManager,
        scope: BroadcastScope,
    ) -> Self {
        Self {
            store,
            ai,
            ws_manager,
            scope,
        }
    }

    /// Store and deliver a user's chat message. Conversations without a
    /// doctor also get an AI reply, stored and delivered after the user's
    /// message.
    ///
    /// If the AI call fails the user's message stays stored and delivered and
    /// the error is returned to the caller.
    pub async fn relay_user_message(
        &self,
        user_id: &str,
        doctor_id: Option<String>,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<RelayedChat> {
        let needs_ai_reply = doctor_id.is_none();
        let user_message = self
            .send_message(NewChatMessage::from_user(user_id, doctor_id, message))
            .await?;

        if !needs_ai_reply {
            return Ok(RelayedChat {
                user_message,
                ai_message: None,
            });
        }

        let reply = self.ai.chat(message, history).await.map_err(|e| {
            tracing::error!("AI reply for message {} failed: {}", user_message.id, e);
            AppError::from(e)
        })?;

        let metadata = reply
            .analysis
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|_| AppError::InternalError)?;

        let ai_message = self
            .store
            .create(NewChatMessage::from_ai(user_id, reply.message, metadata))
            .await?;

        let delivered = self.deliver(
            &ai_message.conversation_key(),
            WsMessage::AiResponse(AiResponsePayload {
                data: ai_message.clone().into(),
                analysis: reply.analysis,
                followup_questions: reply.followup_questions,
            }),
        );
        tracing::debug!("AI reply {} delivered to {} connection(s)", ai_message.id, delivered);

        Ok(RelayedChat {
            user_message,
            ai_message: Some(ai_message),
        })
    }

    /// Store a message and deliver it as a `chat_message` event.
    pub async fn send_message(&self, new_message: NewChatMessage) -> Result<ChatMessage> {
        let message = self.store.create(new_message).await?;

        let delivered = self.deliver(
            &message.conversation_key(),
            WsMessage::ChatMessage(ChatMessagePayload {
                data: message.clone().into(),
            }),
        );
        tracing::debug!("Chat message {} delivered to {} connection(s)", message.id, delivered);

        Ok(message)
    }

    pub async fn get_messages_with_count(
        &self,
        user_id: &str,
        doctor_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ChatMessage>, i64)> {
        let messages = self.store.find_messages(user_id, doctor_id, limit, offset).await?;
        let total = self.store.count_messages(user_id, doctor_id).await?;
        Ok((messages, total))
    }

    fn deliver(&self, key: &ConversationKey, message: WsMessage) -> usize {
        match self.scope {
            BroadcastScope::Global => self.ws_manager.broadcast(message),
            BroadcastScope::Conversation => self.ws_manager.send_to_conversation(key, message),
        }
    }
}
