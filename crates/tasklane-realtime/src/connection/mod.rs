//! Connection tracking: handles, pool, registry, heartbeat, and
//! handshake authentication.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod pool;
pub mod registry;

pub use handle::{ConnectionHandle, ConnectionId};
pub use registry::ConnectionRegistry;
