//! Redis pub/sub bridge for multi-process deployments.
//!
//! With a single process, events fan out in-process through the
//! connection registry. When the `redis-pubsub` feature is enabled and a
//! Redis URL is configured, every user-targeted event is additionally
//! relayed through a shared channel so that it reaches the user's
//! sockets regardless of which process holds them. Each bridge tags its
//! messages with a node ID and ignores its own relays.

#[cfg(feature = "redis-pubsub")]
mod implementation {
    use std::sync::Arc;

    use futures::StreamExt;
    use serde::{Deserialize, Serialize};
    use tokio::sync::broadcast;
    use tracing::{info, warn};
    use uuid::Uuid;

    use tasklane_core::error::AppError;

    use crate::connection::ConnectionRegistry;

    /// Channel used for cross-process event relay.
    pub const EVENT_CHANNEL: &str = "tasklane:events";

    /// Envelope carried over the relay channel.
    #[derive(Debug, Serialize, Deserialize)]
    struct RelayedEvent {
        /// Node that published the event.
        origin: Uuid,
        /// Target user.
        user_id: Uuid,
        /// Pre-serialized server event.
        payload: String,
    }

    /// Redis pub/sub bridge for cross-process message relay.
    pub struct RedisPubSubBridge {
        client: redis::Client,
        node_id: Uuid,
    }

    impl std::fmt::Debug for RedisPubSubBridge {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RedisPubSubBridge")
                .field("node_id", &self.node_id)
                .finish()
        }
    }

    impl RedisPubSubBridge {
        /// Creates a new bridge for the given Redis URL.
        pub fn new(url: &str) -> Result<Self, AppError> {
            let client = redis::Client::open(url)
                .map_err(|e| AppError::internal(format!("Invalid Redis URL: {e}")))?;
            Ok(Self {
                client,
                node_id: Uuid::new_v4(),
            })
        }

        /// Publishes a serialized event for a user to the relay channel.
        pub async fn publish(&self, user_id: Uuid, payload: &str) -> Result<(), AppError> {
            let envelope = serde_json::to_string(&RelayedEvent {
                origin: self.node_id,
                user_id,
                payload: payload.to_string(),
            })?;

            let mut conn = self
                .client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| AppError::internal(format!("Redis connection failed: {e}")))?;

            redis::cmd("PUBLISH")
                .arg(EVENT_CHANNEL)
                .arg(envelope)
                .query_async::<i64>(&mut conn)
                .await
                .map_err(|e| AppError::internal(format!("Redis PUBLISH failed: {e}")))?;

            Ok(())
        }

        /// Subscribe loop: forwards relayed events from other nodes to
        /// local connections. Runs until shutdown.
        pub async fn run(
            self: Arc<Self>,
            registry: Arc<ConnectionRegistry>,
            mut shutdown: broadcast::Receiver<()>,
        ) {
            let mut pubsub = match self.client.get_async_pubsub().await {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "Redis bridge subscribe failed");
                    return;
                }
            };
            if let Err(e) = pubsub.subscribe(EVENT_CHANNEL).await {
                warn!(error = %e, "Redis bridge subscribe failed");
                return;
            }

            info!(node_id = %self.node_id, "Redis bridge subscribed");

            let mut stream = pubsub.on_message();
            loop {
                tokio::select! {
                    msg = stream.next() => {
                        let Some(msg) = msg else { break };
                        let raw: String = match msg.get_payload() {
                            Ok(r) => r,
                            Err(e) => {
                                warn!(error = %e, "Malformed relay payload");
                                continue;
                            }
                        };
                        match serde_json::from_str::<RelayedEvent>(&raw) {
                            Ok(event) if event.origin != self.node_id => {
                                registry.send_raw_to_user(&event.user_id, &event.payload);
                            }
                            Ok(_) => {} // our own relay
                            Err(e) => warn!(error = %e, "Malformed relay envelope"),
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }

            info!(node_id = %self.node_id, "Redis bridge stopped");
        }
    }
}

#[cfg(not(feature = "redis-pubsub"))]
mod implementation {
    use std::sync::Arc;

    use tokio::sync::broadcast;
    use uuid::Uuid;

    use tasklane_core::error::AppError;

    use crate::connection::ConnectionRegistry;

    /// No-op bridge when the `redis-pubsub` feature is disabled.
    #[derive(Debug)]
    pub struct RedisPubSubBridge;

    impl RedisPubSubBridge {
        /// Creates a no-op bridge.
        pub fn new(_url: &str) -> Result<Self, AppError> {
            Ok(Self)
        }

        /// No-op.
        pub async fn publish(&self, _user_id: Uuid, _payload: &str) -> Result<(), AppError> {
            Ok(())
        }

        /// No-op.
        pub async fn run(
            self: Arc<Self>,
            _registry: Arc<ConnectionRegistry>,
            _shutdown: broadcast::Receiver<()>,
        ) {
        }
    }
}

pub use implementation::RedisPubSubBridge;
