//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use tasklane_core::config::RealtimeConfig;
use tasklane_core::error::AppError;

use crate::batch::NotificationBatcher;
use crate::bridge::RedisPubSubBridge;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::registry::ConnectionRegistry;
use crate::events::publisher::{EventPublisher, NotificationSink};

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection registry.
    pub connections: Arc<ConnectionRegistry>,
    /// Notification batcher.
    pub batcher: Arc<NotificationBatcher>,
    /// Event publisher (domain mutations → wire events).
    pub publisher: Arc<EventPublisher>,
    /// Handshake authenticator.
    pub authenticator: WsAuthenticator,
    /// Heartbeat settings for per-connection keepalive loops.
    pub heartbeat: HeartbeatConfig,
    /// Optional cross-process relay bridge.
    bridge: Option<Arc<RedisPubSubBridge>>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        authenticator: WsAuthenticator,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let connections = Arc::new(ConnectionRegistry::new(config.clone()));
        let batcher = Arc::new(NotificationBatcher::new(
            connections.clone(),
            config.batching.clone(),
        ));

        let bridge = config.redis_url.as_deref().and_then(|url| {
            match RedisPubSubBridge::new(url) {
                Ok(b) => Some(Arc::new(b)),
                Err(e) => {
                    warn!(error = %e, "Relay bridge unavailable, running single-process");
                    None
                }
            }
        });

        let publisher = Arc::new(EventPublisher::new(
            connections.clone(),
            batcher.clone(),
            sink,
            bridge.clone(),
        ));
        let heartbeat = HeartbeatConfig::from_realtime(&config);

        info!("Real-time engine initialized");

        Self {
            connections,
            batcher,
            publisher,
            authenticator,
            heartbeat,
            bridge,
            shutdown_tx,
        }
    }

    /// Spawns the background loops: the batcher flush timer and, when
    /// configured, the relay bridge subscriber.
    pub fn start(&self) {
        let batcher = self.batcher.clone();
        tokio::spawn(batcher.run(self.shutdown_tx.subscribe()));

        if let Some(bridge) = &self.bridge {
            let bridge = bridge.clone();
            let registry = self.connections.clone();
            tokio::spawn(bridge.run(registry, self.shutdown_tx.subscribe()));
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        let _ = self.shutdown_tx.send(());
        self.batcher.flush_all().await;
        self.connections.close_all();

        info!("Real-time engine shut down");
        Ok(())
    }
}
