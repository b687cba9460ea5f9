use dashmap::DashMap;
use std::{collections::HashSet, fmt, str::FromStr, sync::Arc};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::{ConversationKey, WsMessage};

pub type WsSender = mpsc::UnboundedSender<WsMessage>;
pub type ConnectionId = Uuid;

/// Which connections receive chat events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastScope {
    /// Every open connection receives every chat event.
    #[default]
    Global,
    /// Only connections subscribed to the event's conversation receive it.
    Conversation,
}

impl FromStr for BroadcastScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(BroadcastScope::Global),
            "conversation" => Ok(BroadcastScope::Conversation),
            other => Err(format!("expected 'global' or 'conversation', got '{}'", other)),
        }
    }
}

impl fmt::Display for BroadcastScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastScope::Global => write!(f, "global"),
            BroadcastScope::Conversation => write!(f, "conversation"),
        }
    }
}

/// Who is on the other end of a connection, as far as the relay knows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionIdentity {
    pub user_id: Option<String>,
    pub role: Option<String>,
    /// True when the identity came from a verified token rather than an envelope.
    pub authenticated: bool,
}

struct ConnectionEntry {
    identity: ConnectionIdentity,
    sender: WsSender,
}

/// Registry of live WebSocket connections and the conversation rooms they
/// are subscribed to.
///
/// Cloning is cheap; all clones share the same maps.
#[derive(Clone, Default)]
pub struct ConnectionManager {
    connections: Arc<DashMap<ConnectionId, ConnectionEntry>>,
    rooms: Arc<DashMap<ConversationKey, HashSet<ConnectionId>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_connection(&self, identity: ConnectionIdentity, sender: WsSender) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        self.connections
            .insert(connection_id, ConnectionEntry { identity, sender });
        connection_id
    }

    pub fn identity(&self, connection_id: &ConnectionId) -> Option<ConnectionIdentity> {
        self.connections
            .get(connection_id)
            .map(|entry| entry.identity.clone())
    }

    /// Bind a user id to a connection that has none yet.
    ///
    /// Returns `false` when the connection is unknown or already bound to a
    /// different user.
    pub fn bind_user(&self, connection_id: &ConnectionId, user_id: &str) -> bool {
        let Some(mut entry) = self.connections.get_mut(connection_id) else {
            return false;
        };
        if let Some(existing) = &entry.identity.user_id {
            return existing == user_id;
        }
        entry.identity.user_id = Some(user_id.to_string());
        true
    }

    pub fn join_conversation(&self, connection_id: ConnectionId, key: ConversationKey) {
        if !self.connections.contains_key(&connection_id) {
            return;
        }
        self.rooms.entry(key).or_default().insert(connection_id);
    }

    pub fn remove_connection(&self, connection_id: &ConnectionId) {
        self.connections.remove(connection_id);
        self.rooms.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn conversation_members(&self, key: &ConversationKey) -> usize {
        self.rooms.get(key).map(|members| members.len()).unwrap_or(0)
    }

    /// Send to every open connection. Returns how many were reached.
    pub fn broadcast(&self, message: WsMessage) -> usize {
        let targets: Vec<ConnectionId> = self.connections.iter().map(|e| *e.key()).collect();
        self.deliver(targets, message)
    }

    /// Send to the connections subscribed to one conversation.
    pub fn send_to_conversation(&self, key: &ConversationKey, message: WsMessage) -> usize {
        let targets: Vec<ConnectionId> = match self.rooms.get(key) {
            Some(members) => members.iter().copied().collect(),
            None => return 0,
        };
        self.deliver(targets, message)
    }

    /// Send to every connection bound to `user_id`.
    pub fn send_to_user(&self, user_id: &str, message: WsMessage) -> usize {
        let targets: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|e| e.identity.user_id.as_deref() == Some(user_id))
            .map(|e| *e.key())
            .collect();
        self.deliver(targets, message)
    }

    pub fn send_to_connection(&self, connection_id: &ConnectionId, message: WsMessage) -> bool {
        self.deliver(vec![*connection_id], message) == 1
    }

    // Targets are collected before sending so no map shard stays locked while
    // a closed connection is being pruned.
    fn deliver(&self, targets: Vec<ConnectionId>, message: WsMessage) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for connection_id in targets {
            let sent = match self.connections.get(&connection_id) {
                Some(entry) => entry.sender.send(message.clone()).is_ok(),
                None => continue,
            };
            if sent {
                delivered += 1;
            } else {
                closed.push(connection_id);
            }
        }

        for connection_id in closed {
            tracing::debug!("Pruning closed connection {}", connection_id);
            self.remove_connection(&connection_id);
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::connect;

    #[test]
    fn test_broadcast_reaches_every_connection() {
        let manager = ConnectionManager::new();
        let mut receivers: Vec<_> = (0..5).map(|_| connect(&manager, None).1).collect();

        assert_eq!(manager.broadcast(WsMessage::Ping), 5);
        for rx in receivers.iter_mut() {
            assert!(matches!(rx.try_recv(), Ok(WsMessage::Ping)));
        }
    }

    #[test]
    fn test_closed_connections_are_skipped_and_pruned() {
        let manager = ConnectionManager::new();
        let (_, mut open_rx) = connect(&manager, None);
        let (_, closed_rx) = connect(&manager, None);
        drop(closed_rx);

        assert_eq!(manager.broadcast(WsMessage::Ping), 1);
        assert_eq!(manager.connection_count(), 1);
        assert!(open_rx.try_recv().is_ok());
    }

    #[test]
    fn test_bind_user_only_once() {
        let manager = ConnectionManager::new();
        let (id, _rx) = connect(&manager, None);

        assert!(manager.bind_user(&id, "u1"));
        assert!(manager.bind_user(&id, "u1"));
        assert!(!manager.bind_user(&id, "u2"));
        assert_eq!(manager.identity(&id).unwrap().user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_conversation_delivery_is_scoped() {
        let manager = ConnectionManager::new();
        let (patient, mut patient_rx) = connect(&manager, Some("u1"));
        let (_other, mut other_rx) = connect(&manager, Some("u2"));
        let key = ConversationKey::new("u1", Some("d1".to_string()));

        manager.join_conversation(patient, key.clone());

        assert_eq!(manager.send_to_conversation(&key, WsMessage::Pong), 1);
        assert!(patient_rx.try_recv().is_ok());
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_remove_connection_leaves_rooms() {
        let manager = ConnectionManager::new();
        let (id, _rx) = connect(&manager, Some("u1"));
        let key = ConversationKey::new("u1", None);
        manager.join_conversation(id, key.clone());
        assert_eq!(manager.conversation_members(&key), 1);

        manager.remove_connection(&id);

        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.conversation_members(&key), 0);
        assert_eq!(manager.send_to_conversation(&key, WsMessage::Pong), 0);
    }

    #[test]
    fn test_send_to_user_targets_all_their_connections() {
        let manager = ConnectionManager::new();
        let (_, mut first) = connect(&manager, Some("u1"));
        let (_, mut second) = connect(&manager, Some("u1"));
        let (_, mut stranger) = connect(&manager, Some("u9"));

        assert_eq!(manager.send_to_user("u1", WsMessage::Pong), 2);
        assert!(first.try_recv().is_ok());
        assert!(second.try_recv().is_ok());
        assert!(stranger.try_recv().is_err());
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("Global".parse::<BroadcastScope>().unwrap(), BroadcastScope::Global);
        assert_eq!(
            "conversation".parse::<BroadcastScope>().unwrap(),
            BroadcastScope::Conversation
        );
        assert!("rooms".parse::<BroadcastScope>().is_err());
    }
}
