use std::sync::Arc;
use uuid::Uuid;

use crate::{
    emergency::{
        emergency_models::{EmergencyLog, NewEmergencyLog},
        emergency_repository::EmergencyStore,
    },
    error::{AppError, Result},
    websocket::{
        types::{EmergencyAlertPayload, WsMessage},
        ConnectionManager,
    },
};

#[derive(Clone)]
pub struct EmergencyService {
    store: Arc<dyn EmergencyStore>,
    ws_manager: ConnectionManager,
}

impl EmergencyService {
    pub fn new(store: Arc<dyn EmergencyStore>, ws_manager: ConnectionManager) -> Self {
        Self { store, ws_manager }
    }

    /// Persist an emergency and alert every connected client.
    ///
    /// Alerts are never scoped to a conversation: whoever is online (doctors,
    /// admins) must see them.
    pub async fn raise(&self, new_log: NewEmergencyLog) -> Result<EmergencyLog> {
        let log = self.store.create(new_log).await?;

        let delivered = self
            .ws_manager
            .broadcast(WsMessage::EmergencyAlert(EmergencyAlertPayload { data: log.clone() }));
        tracing::warn!(
            "Emergency {} ({}) raised for user {:?}, alerted {} connection(s)",
            log.id,
            log.emergency_type,
            log.user_id,
            delivered
        );

        Ok(log)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<EmergencyLog>> {
        self.store.find_by_user(user_id).await
    }

    pub async fn list_active(&self) -> Result<Vec<EmergencyLog>> {
        self.store.find_active().await
    }

    /// Mark an emergency resolved and push the updated record to the
    /// connections of the user who raised it.
    pub async fn resolve(&self, id: Uuid, assigned_doctor_id: Option<&str>) -> Result<EmergencyLog> {
        let log = self
            .store
            .resolve(id, assigned_doctor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Emergency not found".to_string()))?;

        if let Some(user_id) = log.user_id.as_deref() {
            self.ws_manager.send_to_user(
                user_id,
                WsMessage::EmergencyAlert(EmergencyAlertPayload { data: log.clone() }),
            );
        }
        tracing::info!("Emergency {} resolved", log.id);

        Ok(log)
    }
}
