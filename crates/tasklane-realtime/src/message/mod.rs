//! Wire message definitions for the WebSocket protocol.

pub mod types;

pub use types::{ClientMessage, ServerEvent};
