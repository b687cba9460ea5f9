use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::emergency::emergency_models::EmergencyLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One earlier turn of the conversation, as the client remembers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversationTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiseaseCandidate {
    pub disease: String,
    /// 0-100
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub emergency_level: EmergencyLevel,
    #[serde(default)]
    pub predictions: Vec<DiseaseCandidate>,
    #[serde(default)]
    pub recommendations: String,
    // Missing from a model reply means "see a doctor", never "don't".
    #[serde(default = "default_true")]
    pub should_see_doctor: bool,
    #[serde(default)]
    pub should_call_emergency: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<SymptomAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followup_questions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymptomQuery {
    #[validate(length(min = 1, max = 50))]
    pub symptoms: Vec<String>,
    #[validate(length(min = 1, max = 200))]
    pub duration: String,
    #[validate(range(min = 1, max = 10))]
    pub severity: i32,
    pub additional_context: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiChatRequest {
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
}
