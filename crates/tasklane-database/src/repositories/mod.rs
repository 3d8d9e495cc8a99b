//! Concrete repository implementations, one per aggregate.

pub mod attachment;
pub mod notification;
pub mod presence;
pub mod todo;
pub mod user;

pub use attachment::AttachmentRepository;
pub use notification::NotificationRepository;
pub use presence::PresenceRepository;
pub use todo::TodoRepository;
pub use user::UserRepository;
