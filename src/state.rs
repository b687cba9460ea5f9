use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::{
    ai::AiService,
    chat::chat_service::ChatService,
    emergency::emergency_service::EmergencyService,
    prediction::prediction_service::PredictionService,
    websocket::{BroadcastScope, ConnectionManager},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ws_connections: ConnectionManager,
    pub ai_service: AiService,
    pub chat_service: ChatService,
    pub emergency_service: EmergencyService,
    pub prediction_service: PredictionService,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub ai_timeout: Duration,
    pub broadcast_scope: BroadcastScope,
    pub ws_heartbeat: Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let database_max_connections = parse_var(
            "DATABASE_MAX_CONNECTIONS",
            or_default("DATABASE_MAX_CONNECTIONS", "10"),
        )?;
        let port = parse_var("PORT", or_default("PORT", "3000"))?;
        let ai_timeout_secs: u64 = parse_var("AI_TIMEOUT_SECS", or_default("AI_TIMEOUT_SECS", "30"))?;
        let ws_heartbeat_secs: u64 =
            parse_var("WS_HEARTBEAT_SECS", or_default("WS_HEARTBEAT_SECS", "30"))?;
        if ai_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "AI_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        if ws_heartbeat_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "WS_HEARTBEAT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        let broadcast_scope = parse_var(
            "RELAY_BROADCAST_SCOPE",
            or_default("RELAY_BROADCAST_SCOPE", "global"),
        )?;

        let cors_allowed_origins = or_default(
            "CORS_ALLOWED_ORIGINS",
            "http://localhost:3000,http://localhost:5173",
        )
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections,
            host: or_default("HOST", "127.0.0.1"),
            port,
            jwt_secret: required("JWT_SECRET")?,
            openai_api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            openai_base_url: or_default("OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            openai_model: or_default("OPENAI_MODEL", "gpt-5"),
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            broadcast_scope,
            ws_heartbeat: Duration::from_secs(ws_heartbeat_secs),
            cors_allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}
