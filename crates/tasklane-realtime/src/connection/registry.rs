//! Connection registry — handles connection lifecycle and message routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tasklane_core::config::RealtimeConfig;
use tasklane_entity::user::UserSnapshot;

use crate::message::types::{ClientMessage, ServerEvent};

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections for the roster.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionRegistry {
    /// Creates a new connection registry.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// Returns the connection handle and a receiver for outbound messages.
    pub fn register(&self, user: UserSnapshot) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);

        let handle = Arc::new(ConnectionHandle::new(user, tx));
        self.pool.add(handle.clone());

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            username = %handle.user.username,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection. Idempotent.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_closed();

            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Processes an inbound message from a client.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw_message: &str) {
        let handle = match self.pool.get(conn_id) {
            Some(h) => h,
            None => {
                warn!(conn_id = %conn_id, "Message from unknown connection");
                return;
            }
        };

        let msg: ClientMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                let error_msg = ServerEvent::Error {
                    code: "INVALID_MESSAGE".to_string(),
                    message: format!("Failed to parse message: {e}"),
                };
                self.send_event(&handle, &error_msg);
                return;
            }
        };

        match msg {
            ClientMessage::Pong { .. } => {
                handle.record_pong().await;
            }
            ClientMessage::Activity { activity } => {
                debug!(conn_id = %conn_id, activity = %activity, "Client activity");
                let event = ServerEvent::UserActivity {
                    user_id: handle.user_id,
                    activity,
                    timestamp: chrono::Utc::now(),
                };
                self.relay_to_user_peers(&handle.user_id, &handle.id, &event);
            }
        }
    }

    /// Sends an event to a specific user (all their connections).
    ///
    /// At-most-once: delivery failures are logged and never retried.
    pub fn broadcast_to_user(&self, user_id: &Uuid, event: &ServerEvent) {
        let connections = self.pool.get_user_connections(user_id);
        if connections.is_empty() {
            return;
        }
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Failed to serialize server event");
                return;
            }
        };

        for conn in &connections {
            if !conn.send(msg.clone()) {
                warn!(conn_id = %conn.id, "Failed to send to user connection");
            }
        }
    }

    /// Sends an already-serialized message to a user's connections.
    ///
    /// Used by the relay bridge, which receives pre-serialized payloads.
    pub fn send_raw_to_user(&self, user_id: &Uuid, msg: &str) {
        for conn in &self.pool.get_user_connections(user_id) {
            let _ = conn.send(msg.to_string());
        }
    }

    /// Broadcasts an event to all connected clients.
    pub fn broadcast_all(&self, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Failed to serialize broadcast event");
                return;
            }
        };

        for conn in &self.pool.all_connections() {
            let _ = conn.send(msg.clone());
        }
    }

    /// Relays an event to a user's other connections, skipping the
    /// socket it originated from. Never crosses user boundaries.
    pub fn relay_to_user_peers(
        &self,
        user_id: &Uuid,
        origin_conn_id: &Uuid,
        event: &ServerEvent,
    ) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, "Failed to serialize relay event");
                return;
            }
        };

        for conn in &self.pool.get_user_connections(user_id) {
            if conn.id != *origin_conn_id {
                let _ = conn.send(msg.clone());
            }
        }
    }

    fn send_event(&self, handle: &ConnectionHandle, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(msg) => {
                let _ = handle.send(msg);
            }
            Err(e) => error!(error = %e, "Failed to serialize server event"),
        }
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.mark_closed();
            self.pool.remove(&conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Returns all connected user IDs.
    pub fn connected_user_ids(&self) -> Vec<Uuid> {
        self.pool.connected_user_ids()
    }

    /// Checks if a user has at least one live connection.
    pub fn is_online(&self, user_id: &Uuid) -> bool {
        !self.pool.get_user_connections(user_id).is_empty()
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(username: &str) -> UserSnapshot {
        UserSnapshot {
            id: Uuid::new_v4(),
            username: username.to_string(),
            theme: "light".to_string(),
        }
    }

    fn registry() -> ConnectionRegistry {
        ConnectionRegistry::new(RealtimeConfig::default())
    }

    #[tokio::test]
    async fn broadcast_reaches_all_sockets_of_a_user() {
        let reg = registry();
        let user = snapshot("alice");

        let (h1, mut rx1) = reg.register(user.clone());
        let (_h2, mut rx2) = reg.register(user.clone());

        assert_eq!(reg.connection_count(), 2);
        assert_eq!(reg.user_count(), 1);

        let event = ServerEvent::ThemeChanged {
            theme: "dark".to_string(),
        };
        reg.broadcast_to_user(&user.id, &event);

        let m1 = rx1.try_recv().unwrap();
        let m2 = rx2.try_recv().unwrap();
        assert!(m1.contains("theme_changed"));
        assert_eq!(m1, m2);

        reg.unregister(&h1.id);
        assert_eq!(reg.connection_count(), 1);
        assert!(reg.is_online(&user.id));
    }

    #[tokio::test]
    async fn broadcast_to_user_skips_other_users() {
        let reg = registry();
        let alice = snapshot("alice");
        let bob = snapshot("bob");

        let (_ha, mut rx_alice) = reg.register(alice.clone());
        let (_hb, mut rx_bob) = reg.register(bob.clone());

        reg.broadcast_to_user(
            &alice.id,
            &ServerEvent::NotificationsRead { count: 3 },
        );

        assert!(rx_alice.try_recv().is_ok());
        assert!(rx_bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_is_idempotent_and_clears_presence() {
        let reg = registry();
        let user = snapshot("carol");

        let (h, _rx) = reg.register(user.clone());
        reg.unregister(&h.id);
        reg.unregister(&h.id);

        assert!(!reg.is_online(&user.id));
        assert_eq!(reg.connection_count(), 0);
        assert!(!h.is_alive());
    }

    #[tokio::test]
    async fn activity_relay_stays_within_the_user() {
        let reg = registry();
        let alice = snapshot("alice");
        let bob = snapshot("bob");

        let (ha1, mut rx_alice_origin) = reg.register(alice.clone());
        let (_ha2, mut rx_alice_tab) = reg.register(alice.clone());
        let (_hb, mut rx_bob) = reg.register(bob.clone());

        reg.relay_to_user_peers(
            &alice.id,
            &ha1.id,
            &ServerEvent::UserActivity {
                user_id: alice.id,
                activity: "typing".to_string(),
                timestamp: chrono::Utc::now(),
            },
        );

        // Only alice's other tab hears about it.
        assert!(rx_alice_origin.try_recv().is_err());
        assert!(rx_bob.try_recv().is_err());
        let msg = rx_alice_tab.try_recv().unwrap();
        assert!(msg.contains("user_activity"));
        assert!(msg.contains("typing"));
    }
}
