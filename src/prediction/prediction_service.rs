use std::sync::Arc;

use crate::{
    ai::{AiService, SymptomQuery},
    error::{AppError, Result},
    prediction::{
        prediction_models::{DiseasePrediction, NewDiseasePrediction, PredictionResponse},
        prediction_repository::PredictionStore,
    },
};

#[derive(Clone)]
pub struct PredictionService {
    store: Arc<dyn PredictionStore>,
    ai: AiService,
}

impl PredictionService {
    pub fn new(store: Arc<dyn PredictionStore>, ai: AiService) -> Self {
        Self { store, ai }
    }

    /// Analyze the symptoms and keep the predicted diseases for the user.
    /// Nothing is stored when the analysis fails.
    pub async fn predict(&self, user_id: &str, query: &SymptomQuery) -> Result<PredictionResponse> {
        let analysis = self.ai.analyze_symptoms(query).await?;

        let predictions =
            serde_json::to_value(&analysis.predictions).map_err(|_| AppError::InternalError)?;
        let ai_analysis = Some(analysis.recommendations.clone()).filter(|r| !r.is_empty());

        let prediction = self
            .store
            .create(NewDiseasePrediction {
                user_id: user_id.to_string(),
                symptoms: query.symptoms.clone(),
                duration: Some(query.duration.clone()),
                severity: Some(query.severity),
                predictions,
                ai_analysis,
            })
            .await?;

        tracing::info!(
            "Stored prediction {} for user {} ({} candidate(s), {})",
            prediction.id,
            user_id,
            analysis.predictions.len(),
            analysis.emergency_level
        );

        Ok(PredictionResponse {
            prediction,
            analysis,
        })
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<DiseasePrediction>> {
        self.store.find_by_user(user_id).await
    }
}
