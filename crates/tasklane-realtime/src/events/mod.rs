//! Event translation: domain mutations → wire events and persisted
//! notifications.

pub mod publisher;
pub mod templates;

pub use publisher::{EventPublisher, NotificationSink};
