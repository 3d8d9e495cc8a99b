//! # tasklane-realtime
//!
//! Real-time WebSocket engine for Tasklane. Provides:
//!
//! - Connection registry mapping authenticated users to live sockets
//! - Per-user room broadcast (fire-and-forget, at-most-once)
//! - Event translation from domain mutations to wire events and
//!   persisted notifications
//! - Per-user notification batching with size and timer flush
//! - Heartbeat keepalive with dead-connection expiry
//! - Optional multi-node fan-out via Redis pub/sub

pub mod batch;
pub mod bridge;
pub mod connection;
pub mod engine;
pub mod events;
pub mod message;

pub use batch::NotificationBatcher;
pub use connection::registry::ConnectionRegistry;
pub use engine::RealtimeEngine;
pub use events::publisher::EventPublisher;
