use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmergencyLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for EmergencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmergencyLevel::Low => write!(f, "low"),
            EmergencyLevel::Medium => write!(f, "medium"),
            EmergencyLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyLog {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub emergency_type: EmergencyLevel,
    pub symptoms: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub ai_assessment: Option<serde_json::Value>,
    pub action_taken: Option<String>, // self_care, consultation, emergency_call
    pub is_resolved: bool,
    pub assigned_doctor_id: Option<String>,
    pub emergency_contact: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Insert payload; the relay stores `emergencyData` exactly as received.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEmergencyLog {
    pub user_id: Option<String>,
    pub emergency_type: EmergencyLevel,
    pub symptoms: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub ai_assessment: Option<serde_json::Value>,
    pub action_taken: Option<String>,
    #[serde(default)]
    pub is_resolved: bool,
    pub assigned_doctor_id: Option<String>,
    pub emergency_contact: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveEmergencyRequest {
    pub assigned_doctor_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_level_display() {
        assert_eq!(EmergencyLevel::Low.to_string(), "low");
        assert_eq!(EmergencyLevel::Medium.to_string(), "medium");
        assert_eq!(EmergencyLevel::High.to_string(), "high");
    }

    #[test]
    fn test_new_emergency_minimal_payload() {
        let new: NewEmergencyLog = serde_json::from_str(r#"{"emergencyType":"low"}"#).unwrap();
        assert_eq!(new.emergency_type, EmergencyLevel::Low);
        assert!(!new.is_resolved);
        assert!(new.user_id.is_none());
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert!(serde_json::from_str::<NewEmergencyLog>(r#"{"emergencyType":"critical"}"#).is_err());
    }
}
