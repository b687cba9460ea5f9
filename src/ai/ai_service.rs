use std::{future::Future, sync::Arc, time::Duration};

use super::{
    ai_client::{AiCollaborator, AiError},
    ai_models::{ChatResponse, ConversationTurn, SymptomAnalysis, SymptomQuery},
};

/// Service layer around the AI collaborator. Every call is bounded by
/// `timeout`, so a stalled model surfaces as [`AiError::Timeout`] instead of
/// leaving the caller waiting.
#[derive(Clone)]
pub struct AiService {
    collaborator: Arc<dyn AiCollaborator>,
    timeout: Duration,
}

impl AiService {
    pub fn new(collaborator: Arc<dyn AiCollaborator>, timeout: Duration) -> Self {
        Self {
            collaborator,
            timeout,
        }
    }

    pub async fn chat(&self, message: &str, history: &[ConversationTurn]) -> Result<ChatResponse, AiError> {
        self.bounded(self.collaborator.chat(message, history)).await
    }

    pub async fn analyze_symptoms(&self, query: &SymptomQuery) -> Result<SymptomAnalysis, AiError> {
        self.bounded(self.collaborator.analyze_symptoms(query)).await
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, AiError>
    where
        F: Future<Output = Result<T, AiError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("AI call exceeded {:?}", self.timeout);
                Err(AiError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedAi;

    #[tokio::test]
    async fn test_reply_passes_through() {
        let service = AiService::new(Arc::new(ScriptedAi::replying("Drink water")), Duration::from_secs(1));
        let response = service.chat("I feel tired", &[]).await.unwrap();
        assert_eq!(response.message, "Drink water");
        assert_eq!(response.followup_questions.map(|q| q.len()), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_collaborator_times_out() {
        let ai = ScriptedAi::replying("late").with_delay(Duration::from_secs(60));
        let service = AiService::new(Arc::new(ai), Duration::from_secs(5));

        let err = service.chat("hello", &[]).await.unwrap_err();
        assert!(matches!(err, AiError::Timeout(d) if d == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_failures_are_typed() {
        let service = AiService::new(Arc::new(ScriptedAi::failing()), Duration::from_secs(1));
        let err = service.chat("hello", &[]).await.unwrap_err();
        assert!(matches!(err, AiError::Api { status: 503, .. }));
    }
}
