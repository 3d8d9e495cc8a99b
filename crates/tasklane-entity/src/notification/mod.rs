//! Notification entity: model and kind enumeration.

pub mod kind;
pub mod model;

pub use kind::{DeliveryPriority, NotificationKind};
pub use model::{NewNotification, Notification};
