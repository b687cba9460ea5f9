use crate::{
    emergency::emergency_models::{EmergencyLog, NewEmergencyLog},
    error::Result,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait EmergencyStore: Send + Sync {
    async fn create(&self, new_log: NewEmergencyLog) -> Result<EmergencyLog>;

    /// Newest first.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<EmergencyLog>>;

    async fn find_active(&self) -> Result<Vec<EmergencyLog>>;

    async fn resolve(&self, id: Uuid, assigned_doctor_id: Option<&str>) -> Result<Option<EmergencyLog>>;
}

#[derive(Clone)]
pub struct EmergencyRepository {
    pool: PgPool,
}

impl EmergencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmergencyStore for EmergencyRepository {
    async fn create(&self, new_log: NewEmergencyLog) -> Result<EmergencyLog> {
        let log = sqlx::query_as::<_, EmergencyLog>(
            "INSERT INTO emergency_logs
                (user_id, emergency_type, symptoms, ai_assessment, action_taken,
                 is_resolved, assigned_doctor_id, emergency_contact, location)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(new_log.user_id)
        .bind(new_log.emergency_type)
        .bind(new_log.symptoms)
        .bind(new_log.ai_assessment)
        .bind(new_log.action_taken)
        .bind(new_log.is_resolved)
        .bind(new_log.assigned_doctor_id)
        .bind(new_log.emergency_contact)
        .bind(new_log.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<EmergencyLog>> {
        let logs = sqlx::query_as::<_, EmergencyLog>(
            "SELECT * FROM emergency_logs
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn find_active(&self) -> Result<Vec<EmergencyLog>> {
        let logs = sqlx::query_as::<_, EmergencyLog>(
            "SELECT * FROM emergency_logs
             WHERE is_resolved = false
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    async fn resolve(&self, id: Uuid, assigned_doctor_id: Option<&str>) -> Result<Option<EmergencyLog>> {
        let log = sqlx::query_as::<_, EmergencyLog>(
            "UPDATE emergency_logs
             SET is_resolved = true,
                 assigned_doctor_id = COALESCE($2, assigned_doctor_id),
                 resolved_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(assigned_doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }
}
