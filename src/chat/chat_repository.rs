use crate::{
    chat::chat_models::{ChatMessage, NewChatMessage},
    error::Result,
};
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create(&self, new_message: NewChatMessage) -> Result<ChatMessage>;

    /// A user's messages, newest first. With `doctor_id` only that doctor
    /// conversation is returned.
    async fn find_messages(
        &self,
        user_id: &str,
        doctor_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>>;

    async fn count_messages(&self, user_id: &str, doctor_id: Option<&str>) -> Result<i64>;
}

#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn create(&self, new_message: NewChatMessage) -> Result<ChatMessage> {
        let message = sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages (user_id, doctor_id, message, sender, message_type, metadata)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(new_message.user_id)
        .bind(new_message.doctor_id)
        .bind(new_message.message)
        .bind(new_message.sender)
        .bind(new_message.message_type)
        .bind(new_message.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_messages(
        &self,
        user_id: &str,
        doctor_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages
             WHERE user_id = $1
             AND ($2::TEXT IS NULL OR doctor_id = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(doctor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn count_messages(&self, user_id: &str, doctor_id: Option<&str>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages
             WHERE user_id = $1
             AND ($2::TEXT IS NULL OR doctor_id = $2)",
        )
        .bind(user_id)
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
