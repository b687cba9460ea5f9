use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    ai::SymptomQuery,
    error::Result,
    middleware::AuthUser,
    prediction::prediction_models::{DiseasePrediction, PredictionResponse},
    state::AppState,
};

/// Predict likely conditions from symptoms and keep the result
#[utoipa::path(
    post,
    path = "/api/prediction",
    tag = "prediction",
    request_body = SymptomQuery,
    responses(
        (status = 200, description = "Stored prediction with its analysis", body = PredictionResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "AI service failure"),
        (status = 504, description = "AI service timed out")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_prediction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SymptomQuery>,
) -> Result<Json<PredictionResponse>> {
    payload.validate()?;
    let response = state
        .prediction_service
        .predict(auth.user_id(), &payload)
        .await?;
    Ok(Json(response))
}

/// Predictions made for the authenticated user
#[utoipa::path(
    get,
    path = "/api/prediction",
    tag = "prediction",
    responses(
        (status = 200, description = "Predictions, newest first", body = Vec<DiseasePrediction>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_predictions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<DiseasePrediction>>> {
    let predictions = state.prediction_service.list_for_user(auth.user_id()).await?;
    Ok(Json(predictions))
}
