//! Todo use cases: CRUD, lifecycle transitions, bulk operations, export.

pub mod export;
pub mod service;
pub mod store;

pub use export::ExportFormat;
pub use service::TodoService;
pub use store::TodoStore;
