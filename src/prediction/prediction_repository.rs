use crate::{
    error::Result,
    prediction::prediction_models::{DiseasePrediction, NewDiseasePrediction},
};
use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn create(&self, new_prediction: NewDiseasePrediction) -> Result<DiseasePrediction>;

    /// Newest first.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<DiseasePrediction>>;
}

#[derive(Clone)]
pub struct PredictionRepository {
    pool: PgPool,
}

impl PredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionStore for PredictionRepository {
    async fn create(&self, new_prediction: NewDiseasePrediction) -> Result<DiseasePrediction> {
        let prediction = sqlx::query_as::<_, DiseasePrediction>(
            "INSERT INTO disease_predictions
                (user_id, symptoms, duration, severity, predictions, ai_analysis)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(new_prediction.user_id)
        .bind(new_prediction.symptoms)
        .bind(new_prediction.duration)
        .bind(new_prediction.severity)
        .bind(new_prediction.predictions)
        .bind(new_prediction.ai_analysis)
        .fetch_one(&self.pool)
        .await?;

        Ok(prediction)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<DiseasePrediction>> {
        let predictions = sqlx::query_as::<_, DiseasePrediction>(
            "SELECT * FROM disease_predictions
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(predictions)
    }
}
