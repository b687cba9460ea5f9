//! Client for the external language model.
//!
//! The relay and the REST handlers only see [`AiCollaborator`]; the
//! production implementation talks to any OpenAI-compatible
//! `/chat/completions` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::{
    ai_models::{ChatResponse, ConversationTurn, SymptomAnalysis, SymptomQuery},
    prompts,
};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI call timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI service is not configured")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AI API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("AI returned an unusable response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait AiCollaborator: Send + Sync {
    async fn chat(&self, message: &str, history: &[ConversationTurn]) -> Result<ChatResponse, AiError>;

    async fn analyze_symptoms(&self, query: &SymptomQuery) -> Result<SymptomAnalysis, AiError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct CompletionMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionReply,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one completion and return the first choice's content, if any.
    async fn complete(
        &self,
        messages: Vec<prompts::PromptMessage>,
        json_mode: bool,
    ) -> Result<Option<String>, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::NotConfigured)?;

        let request = CompletionRequest {
            model: &self.model,
            messages: messages
                .into_iter()
                .map(|(role, content)| CompletionMessage { role, content })
                .collect(),
            response_format: json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty()))
    }
}

#[async_trait]
impl AiCollaborator for OpenAiClient {
    async fn chat(&self, message: &str, history: &[ConversationTurn]) -> Result<ChatResponse, AiError> {
        let reply = self
            .complete(prompts::chat_messages(message, history), false)
            .await?;

        Ok(ChatResponse {
            message: reply.unwrap_or_else(|| prompts::EMPTY_REPLY_FALLBACK.to_string()),
            analysis: None,
            followup_questions: prompts::followup_questions(message),
        })
    }

    async fn analyze_symptoms(&self, query: &SymptomQuery) -> Result<SymptomAnalysis, AiError> {
        let messages = vec![
            ("system", prompts::ANALYSIS_SYSTEM_PROMPT.to_string()),
            ("user", prompts::symptom_prompt(query)),
        ];
        let reply = self
            .complete(messages, true)
            .await?
            .ok_or_else(|| AiError::MalformedResponse("empty analysis".to_string()))?;

        parse_analysis(&reply)
    }
}

pub(crate) fn parse_analysis(content: &str) -> Result<SymptomAnalysis, AiError> {
    serde_json::from_str(content).map_err(|e| AiError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emergency::emergency_models::EmergencyLevel;

    #[test]
    fn test_parse_analysis() {
        let analysis = parse_analysis(
            r#"{"emergencyLevel":"high","predictions":[{"disease":"Myocardial infarction","confidence":72}],
                "recommendations":"Call emergency services","shouldSeeDoctor":true,"shouldCallEmergency":true}"#,
        )
        .unwrap();
        assert_eq!(analysis.emergency_level, EmergencyLevel::High);
        assert_eq!(analysis.predictions[0].confidence, 72.0);
        assert!(analysis.should_call_emergency);
    }

    #[test]
    fn test_parse_analysis_rejects_prose() {
        let err = parse_analysis("You should rest.").unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let client = OpenAiClient::new(None, "http://127.0.0.1:9", "gpt-5");
        assert!(!client.is_configured());
        let err = client.chat("hello", &[]).await.unwrap_err();
        assert!(matches!(err, AiError::NotConfigured));
    }

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest {
            model: "gpt-5",
            messages: vec![CompletionMessage {
                role: "user",
                content: "hi".into(),
            }],
            response_format: Some(ResponseFormat { kind: "json_object" }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
