//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use crate::message::types::ServerEvent;

use super::handle::ConnectionHandle;

/// Heartbeat configuration.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Grace period after a ping before the connection counts as dead.
    pub ping_timeout: Duration,
}

impl HeartbeatConfig {
    /// Builds the heartbeat settings from the engine configuration.
    pub fn from_realtime(config: &tasklane_core::config::RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            ping_timeout: Duration::from_secs(
                config.ping_interval_seconds + config.ping_timeout_seconds,
            ),
        }
    }
}

/// Run the heartbeat loop for a connection.
///
/// Sends periodic pings and checks for pong responses. Marks the
/// connection dead if no pong arrives within the timeout.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    // First tick completes immediately; skip it so the client gets a
    // chance to pong before the first timeout check.
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let last_pong = *handle.last_pong.read().await;
        let elapsed = Utc::now() - last_pong;

        if let Ok(elapsed_std) = elapsed.to_std() {
            if elapsed_std > config.ping_timeout {
                tracing::warn!(
                    conn_id = %handle.id,
                    elapsed = ?elapsed_std,
                    "Heartbeat timeout, closing connection"
                );
                handle.mark_closed();
                break;
            }
        }

        let ping = ServerEvent::Ping {
            timestamp: Utc::now().timestamp_millis(),
        };
        let sent = serde_json::to_string(&ping)
            .map(|msg| handle.send(msg))
            .unwrap_or(false);

        if !sent {
            tracing::debug!(conn_id = %handle.id, "Ping send failed, marking closed");
            handle.mark_closed();
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
