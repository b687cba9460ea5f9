use super::ai_models::{ConversationTurn, SymptomQuery};

pub const CHAT_SYSTEM_PROMPT: &str = "You are an empathetic AI health assistant named HealthConnect AI. \
Help users with health-related questions, analyze symptoms, and provide preliminary medical guidance. \
Always recommend professional medical care for serious concerns. Be supportive and understanding. \
If symptoms suggest an emergency, clearly state this and recommend immediate medical attention.";

pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a medical AI assistant. Always prioritize patient safety \
and recommend professional medical care when appropriate. Provide responses in valid JSON format.";

pub const EMPTY_REPLY_FALLBACK: &str =
    "I'm sorry, I couldn't process your message. Please try again.";

const SYMPTOM_KEYWORDS: [&str; 10] = [
    "pain", "headache", "fever", "nausea", "dizzy", "cough", "tired", "fatigue", "hurt", "ache",
];

const FOLLOWUP_QUESTIONS: [&str; 4] = [
    "How long have you been experiencing these symptoms?",
    "On a scale of 1-10, how severe is your discomfort?",
    "Have you taken any medication for this?",
    "Do you have any other symptoms I should know about?",
];

/// A role/content pair in the order it is sent to the model.
pub type PromptMessage = (&'static str, String);

pub fn chat_messages(message: &str, history: &[ConversationTurn]) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(("system", CHAT_SYSTEM_PROMPT.to_string()));
    messages.extend(
        history
            .iter()
            .map(|turn| (turn.role.as_str(), turn.content.clone())),
    );
    messages.push(("user", message.to_string()));
    messages
}

pub fn symptom_prompt(query: &SymptomQuery) -> String {
    let context = query
        .additional_context
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("None");

    format!(
        "As a medical AI assistant, analyze the following symptoms:\n\
         - Symptoms: {}\n\
         - Duration: {}\n\
         - Severity (1-10): {}\n\
         - Additional context: {}\n\n\
         Provide a comprehensive analysis in JSON format with:\n\
         - emergencyLevel: 'low', 'medium', or 'high'\n\
         - predictions: array of possible conditions with confidence scores (0-100)\n\
         - recommendations: detailed advice for the patient\n\
         - shouldSeeDoctor: boolean\n\
         - shouldCallEmergency: boolean\n\n\
         Be conservative with emergency assessments and always recommend professional medical advice when uncertain.",
        query.symptoms.join(", "),
        query.duration,
        query.severity,
        context,
    )
}

/// Fixed follow-up questions, offered when the message mentions a symptom.
pub fn followup_questions(message: &str) -> Option<Vec<String>> {
    let lowered = message.to_lowercase();
    SYMPTOM_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
        .then(|| FOLLOWUP_QUESTIONS.iter().map(|q| q.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ai_models::ChatRole;

    #[test]
    fn test_followups_for_symptom_messages() {
        let questions = followup_questions("I have a FEVER since Monday").unwrap();
        assert_eq!(questions.len(), 4);
        assert!(followup_questions("What are your opening hours?").is_none());
    }

    #[test]
    fn test_chat_messages_order() {
        let history = vec![
            ConversationTurn {
                role: ChatRole::User,
                content: "Hi".into(),
            },
            ConversationTurn {
                role: ChatRole::Assistant,
                content: "Hello! How can I help?".into(),
            },
        ];
        let messages = chat_messages("My head hurts", &history);

        let roles: Vec<&str> = messages.iter().map(|(role, _)| *role).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(messages[3].1, "My head hurts");
    }

    #[test]
    fn test_symptom_prompt_mentions_inputs() {
        let prompt = symptom_prompt(&SymptomQuery {
            symptoms: vec!["cough".into(), "fever".into()],
            duration: "3 days".into(),
            severity: 6,
            additional_context: None,
        });
        assert!(prompt.contains("cough, fever"));
        assert!(prompt.contains("Severity (1-10): 6"));
        assert!(prompt.contains("Additional context: None"));
    }
}
