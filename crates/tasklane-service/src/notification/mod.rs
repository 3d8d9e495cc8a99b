//! Notification use cases: listing, read state, and persistence.

pub mod service;
pub mod sink;
pub mod store;

pub use service::NotificationService;
pub use sink::PersistentSink;
pub use store::NotificationStore;
