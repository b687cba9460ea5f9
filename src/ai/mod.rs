pub mod ai_client;
pub mod ai_handlers;
pub mod ai_models;
pub mod ai_service;
pub mod prompts;

pub use ai_client::{AiError, OpenAiClient};
pub use ai_models::{ConversationTurn, SymptomAnalysis, SymptomQuery};
pub use ai_service::AiService;
