//! # tasklane-service
//!
//! Business logic service layer for Tasklane. Each service orchestrates
//! repositories, attachment storage, authentication, and the real-time
//! event publisher to implement application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod attachment;
pub mod context;
pub mod notification;
pub mod presence;
pub mod todo;
pub mod user;

pub use attachment::AttachmentService;
pub use context::RequestContext;
pub use notification::{NotificationService, PersistentSink};
pub use presence::PresenceService;
pub use todo::{ExportFormat, TodoService};
pub use user::UserService;
