use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ai::SymptomAnalysis;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiseasePrediction {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub symptoms: Vec<String>,
    pub duration: Option<String>,
    pub severity: Option<i32>,
    #[schema(value_type = Object)]
    pub predictions: serde_json::Value,
    pub ai_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDiseasePrediction {
    pub user_id: String,
    pub symptoms: Vec<String>,
    pub duration: Option<String>,
    pub severity: Option<i32>,
    pub predictions: serde_json::Value,
    pub ai_analysis: Option<String>,
}

/// A stored prediction together with the full analysis it came from.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    #[serde(flatten)]
    pub prediction: DiseasePrediction,
    pub analysis: SymptomAnalysis,
}
