//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Internal buffer size for per-connection outbound channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// WebSocket ping timeout in seconds.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Notification batching settings.
    #[serde(default)]
    pub batching: BatchingConfig,
    /// Redis URL for multi-node fan-out (requires the `redis-pubsub` feature).
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            batching: BatchingConfig::default(),
            redis_url: None,
        }
    }
}

/// Notification batching settings for the real-time engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// Buffer size that triggers an immediate flush.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Timer-driven flush interval in seconds.
    #[serde(default = "default_flush_interval")]
    pub flush_interval_seconds: u64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            flush_interval_seconds: default_flush_interval(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    10
}

fn default_max_batch_size() -> usize {
    5
}

fn default_flush_interval() -> u64 {
    60
}
